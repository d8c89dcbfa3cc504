//! Hospital comparison selection state.

/// Most hospitals that can be compared at once.
pub const MAX_COMPARED: usize = 5;

/// Ordered set of hospitals shown on the comparison charts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HospitalSelection {
    hospitals: Vec<String>,
}

impl HospitalSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection holding only the target hospital.
    pub fn with_target(target: &str) -> Self {
        Self {
            hospitals: vec![target.to_string()],
        }
    }

    /// Returns `true` if the hospital was added.
    pub fn add(&mut self, hospital: &str) -> bool {
        if self.is_full() || self.contains(hospital) {
            return false;
        }
        self.hospitals.push(hospital.to_string());
        true
    }

    /// Returns `true` if the hospital was removed.
    pub fn remove(&mut self, hospital: &str) -> bool {
        let before = self.hospitals.len();
        self.hospitals.retain(|h| h != hospital);
        self.hospitals.len() != before
    }

    pub fn contains(&self, hospital: &str) -> bool {
        self.hospitals.iter().any(|h| h == hospital)
    }

    pub fn is_full(&self) -> bool {
        self.hospitals.len() >= MAX_COMPARED
    }

    pub fn is_empty(&self) -> bool {
        self.hospitals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hospitals.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.hospitals
    }
}
