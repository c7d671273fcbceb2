pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, Set,
};
use tracing::info;

use crate::entities::{
    cart::Entity as Cart, cart_item::Entity as CartItem, order::Entity as Order,
    order_item::Entity as OrderItem, product::Entity as Product, user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(User).if_not_exists().to_owned(),
        schema.create_table_from_entity(Product).if_not_exists().to_owned(),
        schema.create_table_from_entity(Cart).if_not_exists().to_owned(),
        schema.create_table_from_entity(CartItem).if_not_exists().to_owned(),
        schema.create_table_from_entity(Order).if_not_exists().to_owned(),
        schema.create_table_from_entity(OrderItem).if_not_exists().to_owned(),
    ];

    for statement in statements.iter() {
        db.execute(backend.build(statement)).await?;
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("Failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Inserts a verified admin account unless one with this email already exists.
pub async fn seed_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<(), SeedError> {
    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = user::hash_password(password).map_err(SeedError::Hash)?;

    let admin = user::ActiveModel {
        name: Set("admin".to_owned()),
        email: Set(email.to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        address: Set(user::Address::default()),
        is_verified: Set(true),
        verification_token: Set(None),
        ..Default::default()
    };
    admin.insert(db).await?;
    info!(email = %email, "Seeded admin account");

    Ok(())
}
