//! Credential lookup and roster construction.

use std::collections::HashMap;

use rollcall_core::{Credential, Error as CoreError, Person, PersonId};

use crate::error::Result;
use crate::registry::PersonRegistry;

/// Outcome of resolving a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Credential of an enrolled person.
    Person(PersonId),
    /// The administrative override credential.
    Admin,
    /// Not in the directory.
    NotFound,
}

/// Read-only map from credential to person or administrator.
///
/// Matching is exact on the UID bytes.
#[derive(Debug, Clone)]
pub struct CredentialDirectory {
    admin: Option<Credential>,
    people: HashMap<Credential, PersonId>,
}

impl CredentialDirectory {
    pub fn new(admin: Option<Credential>) -> Self {
        Self {
            admin,
            people: HashMap::new(),
        }
    }

    /// Returns `true` if an administrative credential is configured.
    pub fn has_admin(&self) -> bool {
        self.admin.is_some()
    }

    fn insert(&mut self, credential: Credential, person: PersonId) -> Result<()> {
        if self.admin == Some(credential) {
            return Err(CoreError::AdminCredentialAssigned(credential.to_hex()).into());
        }
        if self.people.contains_key(&credential) {
            return Err(CoreError::DuplicateCredential(credential.to_hex()).into());
        }
        self.people.insert(credential, person);
        Ok(())
    }

    /// Resolve `credential`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_core::{Credential, Person};
    /// use rollcall_controller::{Resolution, Roster};
    ///
    /// let admin = Credential::from_hex("AD000001").unwrap();
    /// let mut roster = Roster::new(admin);
    /// roster.enroll(Person::new(1, "Ada"), Credential::from_hex("04A1B2C3").unwrap()).unwrap();
    /// let (directory, _) = roster.into_parts();
    ///
    /// assert_eq!(directory.resolve(&admin), Resolution::Admin);
    /// assert_eq!(
    ///     directory.resolve(&Credential::from_hex("DEADBEEF").unwrap()),
    ///     Resolution::NotFound
    /// );
    /// ```
    pub fn resolve(&self, credential: &Credential) -> Resolution {
        if self.admin.as_ref() == Some(credential) {
            return Resolution::Admin;
        }
        match self.people.get(credential) {
            Some(&id) => Resolution::Person(id),
            None => Resolution::NotFound,
        }
    }

    /// Number of person credentials.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

/// Startup roster: the directory and registry built together so that every
/// person credential maps to an enrolled person.
#[derive(Debug, Clone)]
pub struct Roster {
    directory: CredentialDirectory,
    registry: PersonRegistry,
}

impl Roster {
    pub fn new(admin: Credential) -> Self {
        Self::with_admin(Some(admin))
    }

    /// Roster with no administrative credential. Exits can then never be
    /// approved and alarms only end on their own.
    pub fn without_admin() -> Self {
        Self::with_admin(None)
    }

    fn with_admin(admin: Option<Credential>) -> Self {
        Self {
            directory: CredentialDirectory::new(admin),
            registry: PersonRegistry::new(),
        }
    }

    /// Enroll `person` holding `credential`.
    ///
    /// Nothing is changed when an error is returned.
    ///
    /// # Errors
    /// - `AdminCredentialAssigned` if `credential` is the admin credential
    /// - `DuplicateCredential` if another person already holds it
    /// - `DuplicatePerson` if the person id is already enrolled
    pub fn enroll(&mut self, person: Person, credential: Credential) -> Result<()> {
        if self.registry.contains(person.id) {
            return Err(CoreError::DuplicatePerson(person.id.0).into());
        }
        self.directory.insert(credential, person.id)?;
        self.registry.insert(person)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn into_parts(self) -> (CredentialDirectory, PersonRegistry) {
        (self.directory, self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use rstest::rstest;

    fn card(hex: &str) -> Credential {
        Credential::from_hex(hex).unwrap()
    }

    fn roster() -> Roster {
        let mut roster = Roster::new(card("AD000001"));
        roster.enroll(Person::new(1, "Ada"), card("04A1B2C3")).unwrap();
        roster.enroll(Person::new(2, "Bo"), card("04A1B2C3D4E5F6")).unwrap();
        roster
    }

    #[rstest]
    #[case("AD000001", Resolution::Admin)]
    #[case("04A1B2C3", Resolution::Person(PersonId(1)))]
    #[case("04A1B2C3D4E5F6", Resolution::Person(PersonId(2)))]
    #[case("04A1B2C4", Resolution::NotFound)]
    #[case("04A1B2C3D4", Resolution::NotFound)]
    fn test_resolve(#[case] hex: &str, #[case] expected: Resolution) {
        let (directory, _) = roster().into_parts();
        assert_eq!(directory.resolve(&card(hex)), expected);
    }

    #[test]
    fn test_without_admin_nothing_resolves_as_admin() {
        let mut roster = Roster::without_admin();
        roster.enroll(Person::new(1, "Ada"), card("AD000001")).unwrap();
        let (directory, _) = roster.into_parts();

        assert!(!directory.has_admin());
        assert_eq!(
            directory.resolve(&card("AD000001")),
            Resolution::Person(PersonId(1))
        );
    }

    #[test]
    fn test_admin_credential_cannot_be_enrolled() {
        let mut roster = roster();
        let err = roster
            .enroll(Person::new(3, "Cy"), card("AD000001"))
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Core(CoreError::AdminCredentialAssigned(_))
        ));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_duplicate_credential_rejected() {
        let mut roster = roster();
        let err = roster
            .enroll(Person::new(3, "Cy"), card("04A1B2C3"))
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Core(CoreError::DuplicateCredential(_))
        ));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_duplicate_person_leaves_directory_untouched() {
        let mut roster = roster();
        let fresh = card("0BADCAFE");
        assert!(roster.enroll(Person::new(1, "Ada again"), fresh).is_err());

        let (directory, registry) = roster.into_parts();
        assert_eq!(directory.resolve(&fresh), Resolution::NotFound);
        assert_eq!(directory.len(), 2);
        assert_eq!(registry.len(), 2);
    }
}
