//! Fixed option lists offered by the forms.

use super::field::SelectOption;
use crate::models::Gender;

pub const GENDER_OPTIONS: &[Gender] = Gender::ALL;

pub fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
        Gender::Other => "Other",
    }
}

pub const IDENTIFICATION_TYPES: &[&str] = &[
    "Birth Certificate",
    "Driver's License",
    "Medical Insurance Card/Policy",
    "Military ID Card",
    "National Identity Card",
    "Passport",
    "Resident Alien Card (Green Card)",
    "Social Security Card",
    "State ID Card",
    "Student ID Card",
    "Voter ID Card",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doctor {
    pub name: &'static str,
    pub image: &'static str,
}

pub const DOCTORS: &[Doctor] = &[
    Doctor { name: "John Green", image: "/assets/images/dr-green.png" },
    Doctor { name: "Leila Cameron", image: "/assets/images/dr-cameron.png" },
    Doctor { name: "David Livingston", image: "/assets/images/dr-livingston.png" },
    Doctor { name: "Evan Peter", image: "/assets/images/dr-peter.png" },
    Doctor { name: "Jane Powell", image: "/assets/images/dr-powell.png" },
    Doctor { name: "Alex Ramirez", image: "/assets/images/dr-remirez.png" },
    Doctor { name: "Jasmine Lee", image: "/assets/images/dr-lee.png" },
    Doctor { name: "Alyana Cruz", image: "/assets/images/dr-cruz.png" },
    Doctor { name: "Hardik Sharma", image: "/assets/images/dr-sharma.png" },
];

pub fn find_doctor(name: &str) -> Option<&'static Doctor> {
    DOCTORS.iter().find(|d| d.name == name)
}

pub fn doctor_options() -> Vec<SelectOption> {
    DOCTORS
        .iter()
        .map(|d| SelectOption {
            value: d.name.to_string(),
            label: d.name.to_string(),
            image: Some(d.image.to_string()),
        })
        .collect()
}

pub fn identification_type_options() -> Vec<SelectOption> {
    IDENTIFICATION_TYPES
        .iter()
        .map(|t| SelectOption::new(t, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_lookup() {
        assert_eq!(
            find_doctor("Jane Powell").map(|d| d.image),
            Some("/assets/images/dr-powell.png")
        );
        assert!(find_doctor("Dr. Who").is_none());
    }

    #[test]
    fn options_carry_images_for_doctors_only() {
        assert!(doctor_options().iter().all(|o| o.image.is_some()));
        assert!(identification_type_options().iter().all(|o| o.image.is_none()));
        assert_eq!(identification_type_options().len(), IDENTIFICATION_TYPES.len());
    }
}
