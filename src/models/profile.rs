//! User profile model

use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

/// Durable per-user record, created empty on first access
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cleaning_time: Option<NaiveDateTime>,
    pub phone_number: Option<String>,
    pub service_type: Option<String>,
}

impl UserProfile {
    /// Name, if one has been given and is not blank
    pub fn known_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }

    /// Copy a completed appointment into the profile
    pub fn apply_appointment(&mut self, appointment: &Appointment) {
        self.description = Some(appointment.description.clone());
        self.cleaning_time = Some(appointment.cleaning_time);
        self.phone_number = Some(appointment.phone_number.clone());
        self.service_type = Some(appointment.service_type.clone());
    }
}

/// The four answers collected by the appointment flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub description: String,
    pub cleaning_time: NaiveDateTime,
    pub phone_number: String,
    pub service_type: String,
}
