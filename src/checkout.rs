//! Checkout flow: turning the cart into an order and collecting payment.
//!
//! ```text
//! cart review -> order created (pending) -> payment collected -> processing
//! ```
//!
//! Payment collection is simulated with a delay the caller can cancel through a
//! [`CancellationToken`]. A cancelled payment leaves the order pending.

use crate::{
    cart::CartState,
    config::app::{AppConfig, PricingConfig},
    core::{order, require_text},
    errors::{Error, Result},
    models::{Order, PaymentMethod},
    session::Session,
    store::Store,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// How the shopper pays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDetails {
    Card {
        number: String,
        expiry: String,
        cvv: String,
        name_on_card: String,
    },
    CashOnDelivery,
}

impl PaymentDetails {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Card { .. } => PaymentMethod::Card,
            Self::CashOnDelivery => PaymentMethod::Cod,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Self::Card {
            number,
            expiry,
            cvv,
            name_on_card,
        } = self
        {
            require_text("Card number", number)?;
            require_text("Expiry date", expiry)?;
            require_text("CVV", cvv)?;
            require_text("Name on card", name_on_card)?;
        }
        Ok(())
    }
}

/// Places orders and collects payment against the shared store.
#[derive(Debug, Clone)]
pub struct Checkout {
    store: Store,
    pricing: PricingConfig,
    payment_delay: Duration,
}

impl Checkout {
    #[must_use]
    pub const fn new(store: Store, pricing: PricingConfig, payment_delay: Duration) -> Self {
        Self {
            store,
            pricing,
            payment_delay,
        }
    }

    /// A checkout using the pricing and payment settings from `config`.
    #[must_use]
    pub const fn from_config(store: Store, config: &AppConfig) -> Self {
        Self::new(store, config.pricing, config.checkout.payment_delay())
    }

    #[must_use]
    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Creates a pending order from the cart for the session user and empties the
    /// cart.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Nobody is logged in
    /// - The cart is empty
    /// - The emptied cart cannot be persisted
    #[instrument(skip_all)]
    pub async fn place_order(&self, session: &Session, cart: &CartState) -> Result<Order> {
        let user = session.current_user().ok_or(Error::NotAuthenticated)?;
        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            return Err(Error::EmptyCart);
        }

        let order = order::create_order(&self.store, &user.id, snapshot.items, &self.pricing).await?;
        cart.clear().await?;
        Ok(order)
    }

    /// Collects payment for a pending order.
    ///
    /// Waits for the simulated processing time unless `cancel` fires first, then
    /// moves the order to `processing`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Card details are incomplete
    /// - `cancel` fires before the payment completes
    /// - The order does not exist or is no longer pending
    #[instrument(skip(self, details, cancel), fields(method = %details.method()))]
    pub async fn process_payment(
        &self,
        order_id: &str,
        details: PaymentDetails,
        cancel: &CancellationToken,
    ) -> Result<Order> {
        details.validate()?;

        tokio::select! {
            () = cancel.cancelled() => {
                warn!("Payment for order {} cancelled", order_id);
                return Err(Error::PaymentCancelled {
                    order_id: order_id.to_string(),
                });
            }
            () = tokio::time::sleep(self.payment_delay) => {}
        }

        let order = order::confirm_payment(&self.store, order_id, details.method()).await?;
        info!("Order {} confirmed", order.id);
        Ok(order)
    }
}

/// Formats card digits as groups of four, e.g. `4242 4242 4242 4242`.
///
/// Non-digits are dropped and at most 16 digits are kept.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).take(16).collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats expiry digits as `MM/YY`.
#[must_use]
pub fn format_expiry_date(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}
