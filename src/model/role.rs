use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Employee,
    Admin,
}

impl Role {
    /// Only an explicit admin cell grants the admin role; anything else reads as employee.
    pub fn from_cell(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Employee
        }
    }

    /// Compare against a role name picked by the caller, ignoring case.
    pub fn matches(&self, selected: &str) -> bool {
        self.as_ref().eq_ignore_ascii_case(selected.trim())
    }
}
