use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("No orders in the dataset: order-based metrics are undefined")]
    NoOrders,

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Calculation error: '{0}' exceeds the representable decimal range")]
    Overflow(String),
}
