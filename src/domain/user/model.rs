//! User domain entity

use chrono::{DateTime, Months, NaiveDate, Utc};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    Admin,
    Buyer,
    Seller,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Buyer => "Buyer",
            Self::Seller => "Seller",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Self::Admin),
            "Buyer" => Some(Self::Buyer),
            "Seller" => Some(Self::Seller),
            _ => None,
        }
    }
}

/// Administrator decision on a seller account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationState {
    Accepted,
    Waiting,
    Denied,
}

impl VerificationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Waiting => "Waiting",
            Self::Denied => "Denied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Accepted" => Some(Self::Accepted),
            "Waiting" => Some(Self::Waiting),
            "Denied" => Some(Self::Denied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub user_type: UserType,
    pub verification_state: VerificationState,
    /// Lifts the one-open-order and order total limits
    pub has_full_access: bool,
    pub image: Option<Vec<u8>>,
    pub registration_time: DateTime<Utc>,
}

impl User {
    pub fn is_adult(&self, today: NaiveDate, adult_age: u32) -> bool {
        is_adult(self.birth_date, today, adult_age)
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn is_seller(&self) -> bool {
        self.user_type == UserType::Seller
    }
}

/// Fields required to insert a user; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub user_type: UserType,
    pub verification_state: VerificationState,
    pub has_full_access: bool,
    pub image: Option<Vec<u8>>,
}

impl NewUser {
    /// Initial verification state and access flags follow the account type:
    /// sellers wait for an administrator, buyers are limited.
    pub fn with_defaults_for(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        let (state, full_access) = match user_type {
            UserType::Seller => (VerificationState::Waiting, true),
            UserType::Admin => (VerificationState::Accepted, true),
            UserType::Buyer => (VerificationState::Accepted, false),
        };
        self.verification_state = state;
        self.has_full_access = full_access;
        self
    }
}

/// True once `birth_date` plus `adult_age` years is on or before `today`.
pub fn is_adult(birth_date: NaiveDate, today: NaiveDate, adult_age: u32) -> bool {
    match birth_date.checked_add_months(Months::new(adult_age * 12)) {
        Some(coming_of_age) => coming_of_age <= today,
        None => false,
    }
}
