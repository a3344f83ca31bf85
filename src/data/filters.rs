use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use super::model::{Dataset, Question};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub products: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub quarter: Option<u8>,
    pub year: Option<i32>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.countries.is_empty()
            && self.quarter.is_none()
            && self.year.is_none()
    }

    pub fn matches(&self, question: &Question) -> bool {
        self.matches_except(question, None)
    }

    fn matches_except(&self, question: &Question, skip: Option<Dimension>) -> bool {
        if skip != Some(Dimension::Product)
            && !self.products.is_empty()
            && !self.products.contains(&question.product)
        {
            return false;
        }

        if skip != Some(Dimension::Country)
            && !self.countries.is_empty()
            && !self.countries.contains(&question.country_code)
        {
            return false;
        }

        let date = case_date(question);
        if skip != Some(Dimension::Quarter)
            && let Some(quarter) = self.quarter
            && date.map(quarter_of) != Some(quarter)
        {
            return false;
        }

        if skip != Some(Dimension::Year)
            && let Some(year) = self.year
            && date.map(|date| date.year()) != Some(year)
        {
            return false;
        }

        true
    }

    /// Query parameters in the order the cluster endpoint expects them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for product in &self.products {
            pairs.push(("product", product.clone()));
        }
        for country in &self.countries {
            pairs.push(("country_code", country.clone()));
        }
        if let Some(quarter) = self.quarter {
            pairs.push(("quarter", quarter.to_string()));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        pairs
    }
}

/// Pending selection edited in the UI plus the copy that produced the current graph.
#[derive(Clone, Debug, Default)]
pub struct FilterState {
    pub selection: FilterSelection,
    pub applied: FilterSelection,
}

impl FilterState {
    pub fn new(initial: FilterSelection) -> Self {
        Self {
            selection: initial.clone(),
            applied: initial,
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        self.selection != self.applied
    }

    pub fn apply(&mut self) -> FilterSelection {
        self.applied = self.selection.clone();
        self.applied.clone()
    }

    pub fn discard(&mut self) {
        self.selection = self.applied.clone();
    }

    pub fn clear(&mut self) {
        self.selection = FilterSelection::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dimension {
    Product,
    Country,
    Quarter,
    Year,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub countries: Vec<String>,
    pub quarters: Vec<u8>,
    pub years: Vec<i32>,
}

impl FilterOptions {
    /// Options still reachable from the full dataset.
    ///
    /// Each dimension is narrowed by every other selected dimension, so picking
    /// any listed option never yields an empty result.
    pub fn derive(full: &Dataset, selection: &FilterSelection) -> Self {
        let mut products = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut quarters = BTreeSet::new();
        let mut years = BTreeSet::new();

        for question in &full.questions {
            if !question.product.is_empty()
                && selection.matches_except(question, Some(Dimension::Product))
            {
                products.insert(question.product.clone());
            }
            if !question.country_code.is_empty()
                && selection.matches_except(question, Some(Dimension::Country))
            {
                countries.insert(question.country_code.clone());
            }

            let Some(date) = case_date(question) else {
                continue;
            };
            if selection.matches_except(question, Some(Dimension::Quarter)) {
                quarters.insert(quarter_of(date));
            }
            if selection.matches_except(question, Some(Dimension::Year)) {
                years.insert(date.year());
            }
        }

        Self {
            products: products.into_iter().collect(),
            countries: countries.into_iter().collect(),
            quarters: quarters.into_iter().collect(),
            years: years.into_iter().rev().collect(),
        }
    }
}

fn case_date(question: &Question) -> Option<NaiveDate> {
    let raw = question.case_created_date.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn quarter_of(date: NaiveDate) -> u8 {
    (date.month0() / 3 + 1) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Analyst,
    ProductManager,
    CountryManager,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "admin" => Ok(Self::Admin),
            "analyst" | "user" => Ok(Self::Analyst),
            "product_manager" | "product" => Ok(Self::ProductManager),
            "country_manager" | "country" => Ok(Self::CountryManager),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Admin => "admin",
            Self::Analyst => "analyst",
            Self::ProductManager => "product manager",
            Self::CountryManager => "country manager",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterVisibility {
    pub product: bool,
    pub country: bool,
}

/// Which filter dimensions a role may change.
///
/// Managers are scoped server-side to their own product or country, so the
/// dimension they are scoped to is hidden.
pub fn visible_filters(role: Role) -> FilterVisibility {
    match role {
        Role::Admin | Role::Analyst => FilterVisibility {
            product: true,
            country: true,
        },
        Role::ProductManager => FilterVisibility {
            product: false,
            country: true,
        },
        Role::CountryManager => FilterVisibility {
            product: true,
            country: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Question;

    fn question(product: &str, country: &str, date: &str) -> Question {
        Question {
            clusters: vec![0],
            question: format!("{product} in {country}"),
            country_code: country.into(),
            case_created_date: date.into(),
            product: product.into(),
            case_no: None,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            clusters: Vec::new(),
            questions: vec![
                question("Alpha", "US", "2024-02-10"),
                question("Alpha", "DE", "2024-07-01T09:30:00"),
                question("Beta", "DE", "2023-11-20"),
                question("Gamma", "FR", "not a date"),
            ],
        }
    }

    #[test]
    fn options_for_empty_selection_cover_everything() {
        let options = FilterOptions::derive(&dataset(), &FilterSelection::default());
        assert_eq!(options.products, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(options.countries, vec!["DE", "FR", "US"]);
        assert_eq!(options.quarters, vec![1, 3, 4]);
        assert_eq!(options.years, vec![2024, 2023]);
    }

    #[test]
    fn options_are_narrowed_by_other_dimensions_only() {
        let mut selection = FilterSelection::default();
        selection.countries.insert("DE".into());
        let options = FilterOptions::derive(&dataset(), &selection);

        assert_eq!(options.products, vec!["Alpha", "Beta"]);
        assert_eq!(options.countries, vec!["DE", "FR", "US"]);
        assert_eq!(options.years, vec![2024, 2023]);
    }

    #[test]
    fn quarter_and_year_filter_on_case_date() {
        let selection = FilterSelection {
            quarter: Some(3),
            year: Some(2024),
            ..FilterSelection::default()
        };
        let data = dataset();
        let matching = data
            .questions
            .iter()
            .filter(|question| selection.matches(question))
            .count();
        assert_eq!(matching, 1);
    }

    #[test]
    fn query_pairs_repeat_multi_select_values() {
        let mut selection = FilterSelection {
            quarter: Some(2),
            ..FilterSelection::default()
        };
        selection.products.insert("Alpha".into());
        selection.products.insert("Beta".into());
        assert_eq!(
            selection.query_pairs(),
            vec![
                ("product", "Alpha".to_string()),
                ("product", "Beta".to_string()),
                ("quarter", "2".to_string()),
            ]
        );
    }

    #[test]
    fn pending_changes_are_tracked_until_applied() {
        let mut state = FilterState::default();
        assert!(!state.has_pending_changes());

        state.selection.year = Some(2024);
        assert!(state.has_pending_changes());

        let applied = state.apply();
        assert_eq!(applied.year, Some(2024));
        assert!(!state.has_pending_changes());

        state.clear();
        assert!(state.has_pending_changes());
        state.discard();
        assert_eq!(state.selection.year, Some(2024));
    }

    #[test]
    fn managers_do_not_see_their_scoped_dimension() {
        assert_eq!(
            visible_filters(Role::ProductManager),
            FilterVisibility {
                product: false,
                country: true
            }
        );
        assert!(!visible_filters(Role::CountryManager).country);
        assert!(visible_filters(Role::Admin).product && visible_filters(Role::Admin).country);
        assert_eq!("Product-Manager".parse::<Role>(), Ok(Role::ProductManager));
        assert!("guest".parse::<Role>().is_err());
    }
}
