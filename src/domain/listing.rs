use time::OffsetDateTime;
use uuid::Uuid;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_SHORT_FIELD_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Offer,
    Request,
}

impl ListingKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Request => "request",
        }
    }
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offer" => Ok(Self::Offer),
            "request" => Ok(Self::Request),
            _ => Err(format!("Invalid listing kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

/// What must hold, beyond ownership, for a status move to be allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionGuard {
    Owner,
    OwnerWithAcceptedApplication,
}

impl ListingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns the guard for `self -> target`, or `None` if the move is never allowed.
    #[must_use]
    pub const fn guard_for(self, target: Self) -> Option<TransitionGuard> {
        if self.is_terminal() {
            return None;
        }
        match (self, target) {
            (Self::Open, Self::InProgress) => Some(TransitionGuard::OwnerWithAcceptedApplication),
            (Self::Open | Self::InProgress, Self::Cancelled) | (Self::InProgress, Self::Completed) => {
                Some(TransitionGuard::Owner)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid listing status: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    pub category: String,
    pub availability: String,
    pub location: String,
    pub is_paid: bool,
    pub price: Option<i64>,
    pub status: ListingStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields supplied by the owner when posting a listing. Prices are in minor currency units.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    pub category: String,
    pub availability: String,
    pub location: String,
    pub is_paid: bool,
    pub price: Option<i64>,
}

impl NewListing {
    /// Trims text fields and checks their bounds. Unpaid listings never carry a price.
    ///
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.category = self.category.trim().to_string();
        self.availability = self.availability.trim().to_string();
        self.location = self.location.trim().to_string();

        if self.title.is_empty() {
            return Err("Title cannot be empty".into());
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("Title is too long (max {MAX_TITLE_LEN} characters)"));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(format!("Description is too long (max {MAX_DESCRIPTION_LEN} characters)"));
        }
        for (name, value) in
            [("Category", &self.category), ("Availability", &self.availability), ("Location", &self.location)]
        {
            if value.chars().count() > MAX_SHORT_FIELD_LEN {
                return Err(format!("{name} is too long (max {MAX_SHORT_FIELD_LEN} characters)"));
            }
        }

        if self.is_paid {
            match self.price {
                None => return Err("Paid listings require a price".into()),
                Some(p) if p < 0 => return Err("Price cannot be negative".into()),
                Some(_) => {}
            }
        } else {
            self.price = None;
        }

        Ok(self)
    }
}
