//! Field mapper.
//!
//! Responsibilities:
//! - Translate one lead record into an ordered form-fill plan
//! - Resolve the state dropdown through the closed lookup table
//! - Derive subject-property fields from the borrower's resolved values
//!
//! No mapper failure is possible from malformed input: every lookup has a
//! default, so bad data degrades to an empty/default value rather than
//! aborting the record.

use std::collections::HashMap;

use crate::config::Config;
use crate::models::lead::LeadRecord;
use crate::models::states;
use crate::utils::format::{currency_amount, normalize_currency, normalize_payment, normalize_phone};

/// Form field selectors.
pub mod selectors {
    pub const FIRST_NAME: &str = "#FirstName";
    pub const LAST_NAME: &str = "#LastName";
    pub const PHONE_NUMBER: &str = "#PhoneNumber";
    pub const EMAIL: &str = "#Email";
    pub const CREDIT_SCORE: &str = "#CreditScore";
    pub const VETERAN: &str = "#Veteran";
    pub const ADDRESS: &str = "#Address";
    pub const CITY: &str = "#City";
    pub const STATE: &str = "#State";
    pub const ZIP: &str = "#Zip";
    pub const PROPERTY_STATE: &str = "#PropertyState";
    pub const PROPERTY_ZIP: &str = "#PropertyZip";
    pub const CURRENT_VALUE: &str = "#CurrentValueFormatted";
    pub const PROPERTY_TYPE: &str = "#PropertyType";
    pub const OCCUPANCY: &str = "#Occupancy";
    pub const CURRENT_LOAN_PROGRAM: &str = "#CurrentLoanProgramName";
    pub const CURRENT_LENDER: &str = "#CurrentLender";
    pub const CURRENT_FINANCE_TERM: &str = "#CurrentFinanceTerm";
    pub const CURRENT_RATE: &str = "#CurrentRate";
    pub const CURRENT_BALANCE: &str = "#CurrentBalanceFormatted";
    pub const MORTGAGE_PAYMENT: &str = "#MortgagePaymentFormatted";
    pub const REVOLVING_DEBT: &str = "#RevolvingDebtFormatted";
    pub const REVOLVING_PAYMENT: &str = "#RevolvingPaymentFormatted";
    pub const INSTALLMENT_DEBT: &str = "#InstallmentDebt";
    pub const INSTALLMENT_PAYMENT: &str = "#InstallmentPayment";
    pub const SUBMIT_BUTTON: &str = "button[value=\"save\"]";
}

/// Source-sheet column names.
mod columns {
    pub const FIRST_NAME: &str = "First Name";
    pub const LAST_NAME: &str = "Last Name";
    pub const PHONE: &str = "Phone Number";
    pub const FICO: &str = "Fico";
    pub const ADDRESS: &str = "Address";
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const ZIP: &str = "Zip Code";
    pub const INITIAL_LOAN: &str = "Initial Loan amount of recent mortgage";
    pub const CURRENT_BALANCE: &str = "Current mortgage balance";
    pub const MORTGAGE_PAYMENT: &str = "Mortgage monthly payment";
    pub const REVOLVING_BALANCE: &str = "Revolving trades balance";
}

/// How a fill step writes its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    /// Type the value character by character.
    Type(String),
    /// Pick a discrete `<select>` option.
    Select(String),
}

/// One field assignment in a fill plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillStep {
    /// Target field selector.
    pub field: &'static str,
    pub action: FieldAction,
    /// Execute only if the field is present in the current form state.
    /// Evaluated at execution time: form visibility depends on prior steps.
    pub conditional: bool,
    /// Extra settle time after the step, for steps that reveal further
    /// fields.
    pub settle_ms: u64,
}

impl FillStep {
    fn typed(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            action: FieldAction::Type(value.into()),
            conditional: false,
            settle_ms: 0,
        }
    }

    fn select(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            action: FieldAction::Select(value.into()),
            conditional: false,
            settle_ms: 0,
        }
    }

    fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }

    fn settle(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }
}

/// The ordered set of field writes derived from a lead record for one
/// submission attempt.
#[derive(Debug, Clone)]
pub struct FillPlan {
    pub steps: Vec<FillStep>,
}

/// Field mapper service.
pub struct FieldMapper {
    fallback_state_code: String,
    state_overrides: HashMap<String, String>,
}

impl FieldMapper {
    pub fn new(config: &Config) -> Self {
        Self {
            fallback_state_code: config.fallback_state_code.clone(),
            state_overrides: config.state_overrides.clone(),
        }
    }

    /// Resolve a postal abbreviation to the form's option value. Config
    /// overrides win over the built-in table; anything unrecognized gets the
    /// fallback code.
    pub fn resolve_state_code(&self, abbr: &str) -> String {
        let abbr = abbr.trim();
        if let Some(code) = self.state_overrides.get(abbr) {
            return code.clone();
        }
        states::state_code(abbr)
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_state_code.clone())
    }

    /// Build the fill plan for one record.
    pub fn build_plan(&self, lead: &LeadRecord) -> FillPlan {
        let state_code = self.resolve_state_code(lead.get_or_empty(columns::STATE));
        let zip = lead.get_or_empty(columns::ZIP).to_string();
        let phone = normalize_phone(lead.get_or_empty(columns::PHONE));
        let property_value = normalize_currency(lead.get_or_empty(columns::INITIAL_LOAN));
        let current_balance = normalize_currency(lead.get_or_empty(columns::CURRENT_BALANCE));
        let revolving_debt = normalize_currency(lead.get_or_empty(columns::REVOLVING_BALANCE));
        // 3% minimum-payment estimate on the revolving balance.
        let revolving_payment =
            ((currency_amount(&revolving_debt) as f64) * 0.03).round() as i64;

        let mut steps = vec![
            // Borrower details
            FillStep::typed(selectors::FIRST_NAME, lead.get_or_empty(columns::FIRST_NAME)),
            FillStep::typed(selectors::LAST_NAME, lead.get_or_empty(columns::LAST_NAME)),
            FillStep::typed(selectors::PHONE_NUMBER, phone),
            // Email is not in the sheet; clear it if the form shows one.
            FillStep::typed(selectors::EMAIL, "").conditional(),
            FillStep::typed(selectors::CREDIT_SCORE, lead.get_or_empty(columns::FICO)),
            FillStep::select(selectors::VETERAN, "false"),
            // Address details
            FillStep::typed(selectors::ADDRESS, lead.get_or_empty(columns::ADDRESS)),
            FillStep::typed(selectors::CITY, lead.get_or_empty(columns::CITY)),
            FillStep::select(selectors::STATE, state_code.clone()),
            FillStep::typed(selectors::ZIP, zip.clone()),
            // Subject property mirrors the borrower's resolved state/zip.
            FillStep::select(selectors::PROPERTY_STATE, state_code),
            FillStep::typed(selectors::PROPERTY_ZIP, zip),
            FillStep::typed(selectors::CURRENT_VALUE, property_value),
            FillStep::select(selectors::PROPERTY_TYPE, "1"),
            FillStep::select(selectors::OCCUPANCY, "1"),
        ];

        // Current-loan details only exist when a mortgage balance is on
        // record. Entering a loan program reveals the rest of the group, so
        // those stay conditional until execution time.
        if currency_amount(&current_balance) > 0 {
            let mortgage_payment =
                normalize_payment(lead.get_or_empty(columns::MORTGAGE_PAYMENT));
            steps.extend([
                FillStep::typed(selectors::CURRENT_LOAN_PROGRAM, "Conventional 80")
                    .settle(1_000),
                FillStep::typed(selectors::CURRENT_LENDER, "Unknown").conditional(),
                // 30yr fixed
                FillStep::select(selectors::CURRENT_FINANCE_TERM, "8").conditional(),
                FillStep::typed(selectors::CURRENT_RATE, "4.5").conditional(),
                FillStep::typed(selectors::CURRENT_BALANCE, current_balance).conditional(),
                FillStep::typed(selectors::MORTGAGE_PAYMENT, mortgage_payment).conditional(),
            ]);
        }

        steps.extend([
            FillStep::typed(selectors::REVOLVING_DEBT, revolving_debt),
            FillStep::typed(selectors::REVOLVING_PAYMENT, revolving_payment.to_string()),
            FillStep::typed(selectors::INSTALLMENT_DEBT, "0"),
            FillStep::typed(selectors::INSTALLMENT_PAYMENT, "0"),
        ]);

        FillPlan { steps }
    }
}
