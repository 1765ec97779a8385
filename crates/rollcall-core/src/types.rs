use crate::{
    Result,
    constants::{MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Proximity credential identifier (4-10 byte UID).
///
/// Stored inline so the type is `Copy` and can be passed around the
/// scheduler loop without allocation.
///
/// # Security
/// Equality is an exact byte match evaluated in constant time. There is no
/// partial or prefix matching.
#[derive(Clone, Copy, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential {
    bytes: [u8; MAX_UID_LENGTH],
    len: u8,
}

impl Credential {
    /// Create a credential from raw UID bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` if the UID is not 4-10 bytes long.
    pub fn new(uid: &[u8]) -> Result<Self> {
        let len = uid.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::InvalidCredential(format!(
                "UID must be {MIN_UID_LENGTH}-{MAX_UID_LENGTH} bytes, got {len}"
            )));
        }

        let mut bytes = [0u8; MAX_UID_LENGTH];
        bytes[..len].copy_from_slice(uid);
        Ok(Self {
            bytes,
            len: len as u8,
        })
    }

    /// Parse a credential from a hexadecimal string (`"04A1B2C3"`).
    ///
    /// Whitespace and `:` separators are ignored, so `"04:A1:B2:C3"` is
    /// accepted as well.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` on malformed hex or bad length.
    pub fn from_hex(s: &str) -> Result<Self> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();
        let raw = hex::decode(&cleaned)
            .map_err(|e| Error::InvalidCredential(format!("{s:?}: {e}")))?;
        Self::new(&raw)
    }

    /// Get the UID bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Get the UID length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always `false`; a credential holds at least four bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Uppercase hexadecimal rendering without separators.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.as_bytes())
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl std::hash::Hash for Credential {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.to_hex())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Credential::from_hex(s)
    }
}

impl TryFrom<String> for Credential {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Credential::from_hex(&value)
    }
}

impl From<Credential> for String {
    fn from(value: Credential) -> Self {
        value.to_hex()
    }
}

/// Physical reader identity.
///
/// Each reader is bound to one zone of the site. The declaration order is
/// the fixed poll order of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderId {
    Gate,
    Classroom,
    Hostel,
}

impl ReaderId {
    /// All readers in poll order: Gate, then Classroom, then Hostel.
    pub const ALL: [ReaderId; 3] = [ReaderId::Gate, ReaderId::Classroom, ReaderId::Hostel];

    /// Readers that double as zone tap points and approval inputs.
    pub const ZONES: [ReaderId; 2] = [ReaderId::Classroom, ReaderId::Hostel];

    /// Wire name used in the event stream.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReaderId::Gate => "gate",
            ReaderId::Classroom => "classroom",
            ReaderId::Hostel => "hostel",
        }
    }

    /// Location a person acquires by tapping this reader, if it is a zone reader.
    #[must_use]
    pub fn zone(self) -> Option<Location> {
        match self {
            ReaderId::Gate => None,
            ReaderId::Classroom => Some(Location::Classroom),
            ReaderId::Hostel => Some(Location::Hostel),
        }
    }

    /// Stable index into per-reader arrays.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReaderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gate" => Ok(ReaderId::Gate),
            "classroom" => Ok(ReaderId::Classroom),
            "hostel" => Ok(ReaderId::Hostel),
            other => Err(Error::UnknownReader(other.to_string())),
        }
    }
}

/// Where a person currently is.
///
/// The numeric codes are part of the `student_info` wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Location {
    #[default]
    Unknown = 0,
    Classroom = 1,
    Hostel = 2,
    AtGate = 3,
    Left = 4,
    Sneaked = 5,
}

impl Location {
    /// Every location value, in code order.
    pub const ALL: [Location; 6] = [
        Location::Unknown,
        Location::Classroom,
        Location::Hostel,
        Location::AtGate,
        Location::Left,
        Location::Sneaked,
    ];

    /// Numeric wire code (0-5).
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a numeric wire code.
    ///
    /// # Errors
    /// Returns `Error::InvalidLocation` for codes above 5.
    pub fn from_code(code: u8) -> Result<Self> {
        Location::ALL
            .get(code as usize)
            .copied()
            .ok_or(Error::InvalidLocation { code })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Location::Unknown => "Unknown",
            Location::Classroom => "Classroom",
            Location::Hostel => "Hostel",
            Location::AtGate => "AtGate",
            Location::Left => "Left",
            Location::Sneaked => "Sneaked",
        };
        f.write_str(name)
    }
}

/// Process-wide occupancy policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMode {
    /// Free time: every zone is allowed.
    #[default]
    Free,
    /// Class time: being in the hostel is a policy violation.
    Class,
}

impl SystemMode {
    /// Wire name used in the event stream.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SystemMode::Free => "free",
            SystemMode::Class => "class",
        }
    }

    /// Returns `true` if a person may be in `location` under this mode.
    #[must_use]
    pub fn permits(self, location: Location) -> bool {
        !(self == SystemMode::Class && location == Location::Hostel)
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SystemMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SystemMode::Free),
            "class" => Ok(SystemMode::Class),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

/// Person identifier as published in `student_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable profile of a tracked person.
///
/// Location is not part of the profile; it lives in the person registry,
/// which is the only place it can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Class or grade label.
    pub class: String,
    /// Room label in the hostel.
    pub dorm: String,
    /// Guardian contact label.
    pub contact: String,
}

impl Person {
    /// Create a profile with only an id and display name.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: PersonId(id),
            name: name.into(),
            class: String::new(),
            dorm: String::new(),
            contact: String::new(),
        }
    }

    /// Set the class label.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Set the room label.
    pub fn with_dorm(mut self, dorm: impl Into<String>) -> Self {
        self.dorm = dorm.into();
        self
    }

    /// Set the contact label.
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }
}
