use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name shown for a school when the user's school join comes back empty.
pub const PLACEHOLDER_SCHOOL_NAME: &str = "SDN 1 PASIRPOGOR";

/// Domain appended to usernames for users without a stored email.
const FALLBACK_EMAIL_DOMAIN: &str = "sekolah.edu";

/// A user's role, as stored in `users.role`.
///
/// Parsing never fails: anything outside the known set is kept verbatim in
/// [`Role::Unrecognized`] so it can still be displayed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// School administrator.
    Admin,
    /// Subject teacher.
    Guru,
    /// Homeroom teacher, owns exactly one class.
    WaliKelas,
    /// Class teacher, treated like a subject teacher.
    GuruKelas,
    /// Any other role string.
    Unrecognized(String),
}

impl Role {
    /// The role string as stored.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Guru => "guru",
            Role::WaliKelas => "wali_kelas",
            Role::GuruKelas => "guru_kelas",
            Role::Unrecognized(raw) => raw,
        }
    }

    /// Whether the role is one of the known roles.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Role::Unrecognized(_))
    }

    /// The display name used when a profile carries no usable name at all.
    pub fn default_display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::WaliKelas => "Wali Kelas",
            Role::Guru | Role::GuruKelas => "Guru",
            Role::Unrecognized(_) => "User",
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            "guru" => Role::Guru,
            "wali_kelas" => Role::WaliKelas,
            "guru_kelas" => Role::GuruKelas,
            other => Role::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A denormalized snapshot of the user's school, embedded for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSnapshot {
    pub id: Option<Uuid>,
    pub name: String,
    pub npsn: String,
    pub address: String,
    pub principal_name: String,
    pub logo_url: Option<String>,
}

impl SchoolSnapshot {
    /// The snapshot used when the school join is null.
    pub fn placeholder(school_id: Option<Uuid>) -> Self {
        Self {
            id: school_id,
            name: PLACEHOLDER_SCHOOL_NAME.to_string(),
            npsn: "-".to_string(),
            address: "-".to_string(),
            principal_name: "-".to_string(),
            logo_url: None,
        }
    }
}

/// A `users` row joined with its school, exactly as the store returns it.
#[derive(Clone, Debug)]
pub struct UserRecord {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's login name.
    pub username: String,
    /// The stored password hash (Argon2 PHC string).
    pub password_hash: String,
    /// The raw role string.
    pub role: String,
    /// The `name` column.
    pub name: Option<String>,
    /// Legacy `nama` alias.
    pub nama: Option<String>,
    /// Legacy `full_name` alias.
    pub full_name: Option<String>,
    /// The user's email address, if stored.
    pub email: Option<String>,
    /// The `kelas` column.
    pub class_name: Option<String>,
    /// The owning school.
    pub school_id: Option<Uuid>,
    /// Whether the user may log in.
    pub is_active: bool,
    /// The timestamp when the user was created.
    pub created_at: Option<DateTime<Utc>>,
    /// The joined school, `None` when the join is null.
    pub school: Option<SchoolSnapshot>,
}

impl UserRecord {
    /// Normalizes the raw row into the profile used everywhere else.
    pub fn into_profile(self) -> UserProfile {
        let role = Role::from(self.role.as_str());
        let display_name = resolve_display_name(
            [
                self.name.as_deref(),
                self.nama.as_deref(),
                self.full_name.as_deref(),
                Some(self.username.as_str()),
            ],
            &role,
        );
        let email = self
            .email
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| format!("{}@{}", self.username, FALLBACK_EMAIL_DOMAIN));
        let school = self
            .school
            .unwrap_or_else(|| SchoolSnapshot::placeholder(self.school_id));

        UserProfile {
            id: self.id,
            username: self.username,
            role,
            display_name,
            email,
            class_name: self.class_name,
            school_id: self.school_id,
            is_active: self.is_active,
            created_at: self.created_at,
            school,
        }
    }
}

/// Picks the first non-blank candidate, falling back to the role's default.
fn resolve_display_name<'a, I>(candidates: I, role: &Role) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_else(|| role.default_display_name())
        .to_string()
}

/// The normalized identity carried by a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    /// Never empty.
    pub display_name: String,
    pub email: String,
    pub class_name: Option<String>,
    pub school_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub school: SchoolSnapshot,
}

impl UserProfile {
    /// Two upper-case letters for the avatar badge.
    pub fn initials(&self) -> String {
        initials_of(&self.display_name)
    }
}

fn initials_of(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => "US".to_string(),
        [single] => single.chars().take(2).collect::<String>().to_uppercase(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}
