use time::OffsetDateTime;
use uuid::Uuid;

pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_CONTACT_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid application status: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Application {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub applicant_id: Uuid,
    pub message: String,
    pub availability: String,
    pub contact_info: String,
    pub status: ApplicationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ApplicationPayload {
    pub message: String,
    pub availability: String,
    pub contact_info: String,
}

impl ApplicationPayload {
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.message = self.message.trim().to_string();
        self.availability = self.availability.trim().to_string();
        self.contact_info = self.contact_info.trim().to_string();

        if self.message.is_empty() {
            return Err("Message cannot be empty".into());
        }
        if self.message.chars().count() > MAX_MESSAGE_LEN {
            return Err(format!("Message is too long (max {MAX_MESSAGE_LEN} characters)"));
        }
        if self.availability.chars().count() > MAX_CONTACT_LEN || self.contact_info.chars().count() > MAX_CONTACT_LEN
        {
            return Err(format!("Availability and contact info are limited to {MAX_CONTACT_LEN} characters"));
        }
        Ok(self)
    }
}
