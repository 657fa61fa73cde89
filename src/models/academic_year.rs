use chrono::NaiveDate;

/// An academic year row, e.g. `2025/2026`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcademicYear {
    pub name: String,
    pub start_date: Option<NaiveDate>,
}

/// The two halves of an academic year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Semester {
    /// Odd (first) semester.
    Ganjil,
    /// Even (second) semester.
    Genap,
}

impl Semester {
    pub const ALL: [Semester; 2] = [Semester::Ganjil, Semester::Genap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Ganjil => "Ganjil",
            Semester::Genap => "Genap",
        }
    }
}

impl AcademicYear {
    /// Login options for this year, odd semester first.
    pub fn term_labels(&self) -> impl Iterator<Item = String> + '_ {
        Semester::ALL
            .iter()
            .map(move |semester| format!("{} {}", self.name, semester.as_str()))
    }
}
