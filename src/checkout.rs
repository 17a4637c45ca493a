//! Card form checks and the simulated payment flow

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::i18n::{translate_with, Language};
use crate::models::RecordId;
use crate::prefs::{Preferences, PurchaseBanner, PurchaseStatus};
use crate::pricing::{CartSummary, Money};
use crate::Marketplace;

const MASK: char = '•';

/// Issuing bank picked on the payment form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    #[default]
    Guayaquil,
    Pichincha,
}

/// Card remembered between purchases. Only the last four digits are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCard {
    pub cardholder: String,
    pub last4: String,
    pub expiry: String,
}

impl SavedCard {
    /// `•••• •••• •••• 1234`
    pub fn masked(&self) -> String {
        format!("•••• •••• •••• {}", self.last4)
    }
}

/// Form fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Cardholder,
    CardNumber,
    Expiry,
    Cvv,
    IdNumber,
}

impl CardField {
    /// Catalog key of the message shown under the field
    pub fn message_key(&self) -> &'static str {
        match self {
            CardField::Cardholder => "payment.errors.cardholder",
            CardField::CardNumber => "payment.errors.cardNumber",
            CardField::Expiry => "payment.errors.expiry",
            CardField::Cvv => "payment.errors.cvv",
            CardField::IdNumber => "payment.errors.idNumber",
        }
    }
}

/// Raw payment form input
#[derive(Debug, Clone, Default)]
pub struct CardForm {
    pub cardholder: String,
    pub card_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
    pub id_number: String,
    pub remember: bool,
    pub bank: Bank,
}

/// A form that passed every check. Only `CardForm::validate` builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCard {
    cardholder: String,
    last4: String,
    expiry: String,
    remember: bool,
    bank: Bank,
}

impl ValidatedCard {
    pub fn cardholder(&self) -> &str {
        &self.cardholder
    }

    pub fn last4(&self) -> &str {
        &self.last4
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn remember(&self) -> bool {
        self.remember
    }

    fn to_saved(&self) -> SavedCard {
        SavedCard {
            cardholder: self.cardholder.clone(),
            last4: self.last4.clone(),
            expiry: self.expiry.clone(),
        }
    }
}

fn digits_of(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn is_expiry(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'/'
        && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit)
}

impl CardForm {
    /// Form pre-filled from a remembered card
    pub fn prefilled(saved: &SavedCard) -> Self {
        Self {
            cardholder: saved.cardholder.clone(),
            card_number: saved.masked(),
            expiry: saved.expiry.clone(),
            remember: true,
            ..Default::default()
        }
    }

    /// Check every field, reporting all failures at once. The masked number of
    /// a remembered card counts as a valid number.
    pub fn validate(&self, saved: Option<&SavedCard>) -> std::result::Result<ValidatedCard, Vec<CardField>> {
        let mut failed = Vec::new();
        let digits = digits_of(&self.card_number);

        if self.cardholder.trim().is_empty() {
            failed.push(CardField::Cardholder);
        }
        let masked_ok = saved
            .map(|card| self.card_number.contains(MASK) && self.card_number.contains(&card.last4))
            .unwrap_or(false);
        if digits.len() != 16 && !masked_ok {
            failed.push(CardField::CardNumber);
        }
        if !is_expiry(&self.expiry) {
            failed.push(CardField::Expiry);
        }
        if self.cvv.len() != 3 || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            failed.push(CardField::Cvv);
        }
        if self.id_number.trim().chars().count() < 8 {
            failed.push(CardField::IdNumber);
        }

        if !failed.is_empty() {
            return Err(failed);
        }

        let tail: String = digits.chars().skip(digits.len().saturating_sub(4)).collect();
        Ok(ValidatedCard {
            cardholder: self.cardholder.clone(),
            last4: format!("{:•>4}", tail),
            expiry: self.expiry.clone(),
            remember: self.remember,
            bank: self.bank,
        })
    }
}

/// Card number as shown on the card preview: digits in groups of four,
/// padded with `•` to sixteen.
pub fn mask_card_number(input: &str, saved: Option<&SavedCard>) -> String {
    if let Some(saved) = saved.filter(|_| input.contains(MASK)) {
        return saved.masked();
    }
    let padded: Vec<char> = digits_of(input)
        .chars()
        .chain(std::iter::repeat(MASK))
        .take(16.max(digits_of(input).len()))
        .collect();
    padded
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Proof that a charge went through
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub reference: Uuid,
    pub amount: f64,
    pub bank: Bank,
    pub approved_at: DateTime<Utc>,
}

/// Whatever takes the money
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: f64, card: &ValidatedCard) -> Result<PaymentReceipt>;
}

/// Approves every charge after a short pause
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1800),
        }
    }
}

impl SimulatedGateway {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount: f64, card: &ValidatedCard) -> Result<PaymentReceipt> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Payment(format!("cannot charge {}", Money(amount))));
        }
        tokio::time::sleep(self.delay).await;
        Ok(PaymentReceipt {
            reference: Uuid::new_v4(),
            amount,
            bank: card.bank(),
            approved_at: Utc::now(),
        })
    }
}

/// Result of a completed checkout
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub receipt: PaymentReceipt,
    pub summary: CartSummary,
    /// False when the charge went through but the cart rows could not be removed
    pub cart_cleared: bool,
    /// False when the remembered-card choice could not be written
    pub card_saved: bool,
    /// False when the banner could not be written for the next visit
    pub banner_saved: bool,
    pub banner: PurchaseBanner,
}

/// Pays for a user's cart
pub struct Checkout<'a> {
    market: &'a Marketplace,
    prefs: &'a Preferences,
    gateway: &'a dyn PaymentGateway,
    language: Language,
}

impl<'a> Checkout<'a> {
    pub fn new(market: &'a Marketplace, prefs: &'a Preferences, gateway: &'a dyn PaymentGateway) -> Self {
        Self {
            market,
            prefs,
            gateway,
            language: prefs.language(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Charge the cart total, then remember or forget the card, empty the cart
    /// and leave the success banner for the cart page.
    pub async fn pay(&self, user_id: &RecordId, card: &ValidatedCard) -> Result<CheckoutOutcome> {
        let summary = self.market.cart().summary(user_id).await?;
        if summary.is_empty() {
            return Err(Error::validation("cart", "there is nothing to pay for"));
        }

        let receipt = self.gateway.charge(summary.total, card).await?;
        info!("payment {} approved for {}", receipt.reference, Money(summary.total));

        // Past this point the money is taken; nothing below may fail the call.
        let saved = if card.remember() { Some(card.to_saved()) } else { None };
        let card_saved = match self.prefs.set_saved_card(saved) {
            Ok(()) => true,
            Err(err) => {
                error!("could not store the card choice after payment {}: {}", receipt.reference, err);
                false
            }
        };

        let cart_cleared = match self.market.cart().clear(user_id).await {
            Ok(()) => true,
            Err(err) => {
                error!("could not clear the cart after payment {}: {}", receipt.reference, err);
                false
            }
        };

        let total = Money(summary.total).to_string();
        let banner = PurchaseBanner {
            message: translate_with(self.language, "payment.success", &[("total", &total)]),
            status: PurchaseStatus::Success,
        };
        let banner_saved = match self.prefs.set_last_purchase(banner.clone()) {
            Ok(()) => true,
            Err(err) => {
                error!("could not store the banner for payment {}: {}", receipt.reference, err);
                false
            }
        };

        Ok(CheckoutOutcome {
            receipt,
            summary,
            cart_cleared,
            card_saved,
            banner_saved,
            banner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CardForm {
        CardForm {
            cardholder: "Ana Pérez".into(),
            card_number: "4111 1111 1111 1234".into(),
            expiry: "09/27".into(),
            cvv: "123".into(),
            id_number: "0912345678".into(),
            remember: true,
            bank: Bank::Pichincha,
        }
    }

    #[test]
    fn valid_form_keeps_only_the_last_four_digits() {
        let card = valid_form().validate(None).unwrap();
        assert_eq!(card.last4(), "1234");
        assert_eq!(card.bank(), Bank::Pichincha);
        assert_eq!(card.to_saved().masked(), "•••• •••• •••• 1234");
    }

    #[test]
    fn every_failing_field_is_reported() {
        let form = CardForm {
            cardholder: "  ".into(),
            card_number: "4111".into(),
            expiry: "9/27".into(),
            cvv: "12a".into(),
            id_number: " 1234567 ".into(),
            ..Default::default()
        };
        assert_eq!(
            form.validate(None).unwrap_err(),
            vec![
                CardField::Cardholder,
                CardField::CardNumber,
                CardField::Expiry,
                CardField::Cvv,
                CardField::IdNumber
            ]
        );
        assert_eq!(CardField::Cvv.message_key(), "payment.errors.cvv");
    }

    #[test]
    fn remembered_card_passes_with_its_mask() {
        let saved = SavedCard {
            cardholder: "Ana".into(),
            last4: "9876".into(),
            expiry: "01/28".into(),
        };
        let mut form = CardForm::prefilled(&saved);
        form.cvv = "321".into();
        form.id_number = "12345678".into();

        assert!(form.validate(None).is_err());
        let card = form.validate(Some(&saved)).unwrap();
        assert_eq!(card.last4(), "9876");
    }

    #[test]
    fn masking_pads_and_groups() {
        assert_eq!(mask_card_number("4111 22", None), "4111 22•• •••• ••••");
        assert_eq!(mask_card_number("", None), "•••• •••• •••• ••••");
        let saved = SavedCard {
            cardholder: "A".into(),
            last4: "1234".into(),
            expiry: "01/28".into(),
        };
        assert_eq!(mask_card_number("•••• 1234", Some(&saved)), "•••• •••• •••• 1234");
    }

    #[test]
    fn simulated_gateway_approves_positive_amounts() {
        let gateway = SimulatedGateway::with_delay(Duration::from_millis(1));
        let card = valid_form().validate(None).unwrap();
        tokio_test::block_on(async {
            let receipt = gateway.charge(26.5, &card).await.unwrap();
            assert_eq!(receipt.amount, 26.5);
            assert!(matches!(gateway.charge(0.0, &card).await, Err(Error::Payment(_))));
        });
    }
}
