use std::collections::HashMap;

use crate::domain::signup_email::SignupEmail;

const FIRST_STEP: u8 = 1;
const LAST_STEP: u8 = 4;
const TOP_FEATURES_MAX: usize = 3;
const MULTI_VALUE_MAX: usize = 10;

/// Fields of the four-step signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FullName,
    Email,
    AgeRange,
    Occupation,
    CurrentTools,
    PainPoints,
    TopFeatures,
    MainGoal,
    WillingToPay,
    PriceJustification,
    ReferralSource,
}

/// The answers collected across the four steps, frozen on submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupAnswers {
    pub full_name: String,
    pub email: String,
    pub age_range: String,
    pub occupation: String,
    pub current_tools: Vec<String>,
    pub pain_points: Vec<String>,
    pub top_features: Vec<String>,
    pub main_goal: String,
    pub willing_to_pay: String,
    pub price_justification: String,
    pub referral_source: String,
}

/// State of the multi-step signup form. Holds field values and per-field
/// error messages; never touches the network.
#[derive(Debug)]
pub struct SignupForm {
    step: u8,
    answers: SignupAnswers,
    errors: HashMap<FormField, String>,
}

impl Default for SignupForm {
    fn default() -> SignupForm {
        SignupForm::new()
    }
}

impl SignupForm {
    pub fn new() -> SignupForm {
        SignupForm {
            step: FIRST_STEP,
            answers: SignupAnswers::default(),
            errors: HashMap::new(),
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn answers(&self) -> &SignupAnswers {
        &self.answers
    }

    pub fn errors(&self) -> &HashMap<FormField, String> {
        &self.errors
    }

    /// Validates the current step only. Moves forward (clamped at the last
    /// step) when it passes; otherwise fills the error map and stays put.
    pub fn advance(&mut self) -> bool {
        self.errors = self.validate_step(self.step);

        if !self.errors.is_empty() {
            return false;
        }

        self.step = LAST_STEP.min(self.step + 1);

        true
    }

    /// Moves back one step, clamped at the first. Going back never validates.
    pub fn retreat(&mut self) {
        self.step = FIRST_STEP.max(self.step - 1);
    }

    /// Sets a scalar field and clears its pending error. Multi-value fields
    /// are driven through `toggle_multi_value` instead.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();

        match field {
            FormField::FullName => self.answers.full_name = value,
            FormField::Email => self.answers.email = value,
            FormField::AgeRange => self.answers.age_range = value,
            FormField::Occupation => self.answers.occupation = value,
            FormField::MainGoal => self.answers.main_goal = value,
            FormField::WillingToPay => self.answers.willing_to_pay = value,
            FormField::PriceJustification => self.answers.price_justification = value,
            FormField::ReferralSource => self.answers.referral_source = value,
            FormField::CurrentTools | FormField::PainPoints | FormField::TopFeatures => return,
        }

        self.errors.remove(&field);
    }

    /// Removes the value if selected, adds it if there is room under the
    /// field's cap, and does nothing when the cap is reached.
    pub fn toggle_multi_value(&mut self, field: FormField, value: &str) {
        let (selections, max_items) = match field {
            FormField::CurrentTools => (&mut self.answers.current_tools, MULTI_VALUE_MAX),
            FormField::PainPoints => (&mut self.answers.pain_points, MULTI_VALUE_MAX),
            FormField::TopFeatures => (&mut self.answers.top_features, TOP_FEATURES_MAX),
            _ => return,
        };

        if let Some(position) = selections.iter().position(|selected| selected == value) {
            selections.remove(position);
        } else if selections.len() < max_items {
            selections.push(value.to_string());
        }

        self.errors.remove(&field);
    }

    /// Validates every step and hands out the immutable answers. On failure
    /// the error map points at all the failing fields.
    pub fn freeze(&mut self) -> Option<SignupAnswers> {
        let mut errors = HashMap::new();

        for step in FIRST_STEP..=LAST_STEP {
            errors.extend(self.validate_step(step));
        }

        self.errors = errors;

        if self.errors.is_empty() {
            Some(self.answers.clone())
        } else {
            None
        }
    }

    fn validate_step(&self, step: u8) -> HashMap<FormField, String> {
        let mut errors = HashMap::new();
        let answers = &self.answers;

        match step {
            1 => {
                if answers.full_name.trim().is_empty() {
                    errors.insert(FormField::FullName, String::from("Name is required"));
                }
                if answers.email.trim().is_empty() {
                    errors.insert(FormField::Email, String::from("Email is required"));
                } else if SignupEmail::parse(answers.email.clone()).is_err() {
                    errors.insert(FormField::Email, String::from("Please enter a valid email"));
                }
                if answers.age_range.is_empty() {
                    errors.insert(
                        FormField::AgeRange,
                        String::from("Please select your age range"),
                    );
                }
                if answers.occupation.is_empty() {
                    errors.insert(
                        FormField::Occupation,
                        String::from("Please select your occupation"),
                    );
                }
            }
            2 => {
                if answers.current_tools.is_empty() {
                    errors.insert(
                        FormField::CurrentTools,
                        String::from("Select at least one option"),
                    );
                }
                if answers.pain_points.is_empty() {
                    errors.insert(
                        FormField::PainPoints,
                        String::from("Select at least one pain point"),
                    );
                }
            }
            3 => {
                if answers.top_features.is_empty() {
                    errors.insert(
                        FormField::TopFeatures,
                        String::from("Select at least one feature"),
                    );
                } else if answers.top_features.len() > TOP_FEATURES_MAX {
                    errors.insert(
                        FormField::TopFeatures,
                        String::from("Select up to 3 features"),
                    );
                }
                if answers.main_goal.is_empty() {
                    errors.insert(FormField::MainGoal, String::from("Select your main goal"));
                }
            }
            4 => {
                if answers.willing_to_pay.is_empty() {
                    errors.insert(
                        FormField::WillingToPay,
                        String::from("Please select a pricing option"),
                    );
                }
                if answers.referral_source.is_empty() {
                    errors.insert(
                        FormField::ReferralSource,
                        String::from("Let us know how you found us"),
                    );
                }
            }
            _ => {}
        }

        errors
    }
}
