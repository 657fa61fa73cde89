use std::sync::Arc;

use crate::repositories::academic_year::AcademicYearStore;

/// Offered when the academic year table can't be read.
pub const FALLBACK_TERMS: [&str; 2] = ["2025/2026 Ganjil", "2025/2026 Genap"];

/// Builds the semester choices for the login form.
#[derive(Clone)]
pub struct TermCatalog {
    years: Arc<dyn AcademicYearStore>,
}

impl TermCatalog {
    pub fn new(years: Arc<dyn AcademicYearStore>) -> Self {
        Self { years }
    }

    /// Every active year expanded to its two semesters, newest year first.
    pub async fn options(&self) -> Vec<String> {
        match self.years.list_active().await {
            Ok(years) => years.iter().flat_map(|year| year.term_labels()).collect(),
            Err(e) => {
                tracing::warn!("⚠️ Academic years unavailable, using fallback terms: {}", e);
                FALLBACK_TERMS.iter().map(|term| term.to_string()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MemoryAcademicYears;

    #[tokio::test]
    async fn expands_each_year_into_two_semesters() {
        let catalog = TermCatalog::new(Arc::new(MemoryAcademicYears::with_names(&[
            "2025/2026",
            "2024/2025",
        ])));

        assert_eq!(
            catalog.options().await,
            vec![
                "2025/2026 Ganjil",
                "2025/2026 Genap",
                "2024/2025 Ganjil",
                "2024/2025 Genap",
            ]
        );
    }

    #[tokio::test]
    async fn store_failure_falls_back() {
        let catalog = TermCatalog::new(Arc::new(MemoryAcademicYears::failing()));
        assert_eq!(catalog.options().await, FALLBACK_TERMS);
    }

    #[tokio::test]
    async fn no_active_years_means_no_options() {
        let catalog = TermCatalog::new(Arc::new(MemoryAcademicYears::with_names(&[])));
        assert!(catalog.options().await.is_empty());
    }
}
