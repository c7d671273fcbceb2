use super::Email;
use crate::entities::order::{PaymentMethod, PaymentStatus};

pub fn verification_email(to: &str, public_url: &str, token: &str) -> Email {
    let link = format!("{public_url}/verify?token={token}");

    Email {
        to: to.to_owned(),
        subject: "Verify Your Email".to_owned(),
        html_body: format!(
            "<strong>Please verify your email by clicking on the following link:</strong> \
             <a href=\"{link}\">Verify Email</a>"
        ),
        text_body: format!("Please verify your email by opening the following link:\n\n{link}\n"),
    }
}

pub fn order_confirmation_email(
    to: &str,
    name: &str,
    order_id: i32,
    delivery_date: &str,
    total_amount: f64,
    payment_method: PaymentMethod,
) -> Email {
    Email {
        to: to.to_owned(),
        subject: "Order Confirmation".to_owned(),
        html_body: format!(
            "<strong>Dear {name},</strong><br><br>Thank you for your purchase! Your order \
             (ID: {order_id}) has been placed successfully and will be delivered by \
             <strong>{delivery_date}</strong>.<br><br>Total Amount: \
             <strong>${total_amount:.2}</strong><br>Payment Method: \
             <strong>{payment_method}</strong><br><br>Thank you for shopping with us!"
        ),
        text_body: format!(
            "Dear {name},\n\nThank you for your purchase! Your order (ID: {order_id}) has been \
             placed successfully and will be delivered by {delivery_date}.\n\nTotal Amount: \
             ${total_amount:.2}\nPayment Method: {payment_method}\n\nThank you for shopping with us!\n"
        ),
    }
}

pub fn crypto_payment_received_email(to: &str, name: &str, order_id: i32) -> Email {
    Email {
        to: to.to_owned(),
        subject: "Crypto Payment Received".to_owned(),
        html_body: format!(
            "<strong>Dear {name},</strong><br><br>We have received your proof of cryptocurrency \
             payment for order (ID: {order_id}). Your order will be processed once the payment \
             is verified.<br><br>Thank you for shopping with us!"
        ),
        text_body: format!(
            "Dear {name},\n\nWe have received your proof of cryptocurrency payment for order \
             (ID: {order_id}). Your order will be processed once the payment is verified.\n\n\
             Thank you for shopping with us!\n"
        ),
    }
}

pub fn payment_status_email(to: &str, name: &str, order_id: i32, status: PaymentStatus) -> Email {
    Email {
        to: to.to_owned(),
        subject: "Payment Status Updated".to_owned(),
        html_body: format!(
            "<strong>Dear {name},</strong><br><br>Your order (ID: {order_id}) payment status \
             has been updated to <strong>{status}</strong>.<br><br>Thank you for shopping with us!"
        ),
        text_body: format!(
            "Dear {name},\n\nYour order (ID: {order_id}) payment status has been updated to \
             '{status}'.\n\nThank you for shopping with us!\n"
        ),
    }
}
