//! Placement-data mining.
//!
//! A regex/pattern pass over page text and extracted document text. This is
//! best-effort text mining, not guaranteed extraction: each pattern is
//! matched independently and crore figures are normalized to lakhs (LPA).

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Recruiters recognized by name. Matching is case-insensitive substring
/// search over the mined text.
pub const RECOGNIZED_RECRUITERS: &[&str] = &[
    "Infosys",
    "TCS",
    "Tata Consultancy Services",
    "Wipro",
    "Accenture",
    "Cognizant",
    "Capgemini",
    "IBM",
    "HCL",
    "Tech Mahindra",
    "Amazon",
    "Microsoft",
    "Google",
    "Deloitte",
    "Oracle",
    "Cisco",
    "Zoho",
    "Mindtree",
    "Mphasis",
    "Virtusa",
    "Hexaware",
    "Persistent",
    "L&T Infotech",
    "DXC Technology",
];

/// Raw placement matches mined from one text (a page or one document).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementData {
    /// Salary figures in LPA (crores converted)
    pub salary_figures: Vec<f64>,
    pub companies: Vec<String>,
    pub student_counts: Vec<u32>,
    pub academic_years: Vec<String>,
    pub placement_percentages: Vec<f32>,
    pub offer_counts: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_package: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_package: Option<f64>,
}

impl PlacementData {
    pub fn is_empty(&self) -> bool {
        self.salary_figures.is_empty()
            && self.companies.is_empty()
            && self.student_counts.is_empty()
            && self.academic_years.is_empty()
            && self.placement_percentages.is_empty()
            && self.offer_counts.is_empty()
    }

    /// Fold another mined batch into this one, deduplicating name lists.
    pub fn merge(&mut self, other: &PlacementData) {
        self.salary_figures.extend(&other.salary_figures);
        for company in &other.companies {
            if !self.companies.contains(company) {
                self.companies.push(company.clone());
            }
        }
        self.student_counts.extend(&other.student_counts);
        for year in &other.academic_years {
            if !self.academic_years.contains(year) {
                self.academic_years.push(year.clone());
            }
        }
        self.placement_percentages.extend(&other.placement_percentages);
        self.offer_counts.extend(&other.offer_counts);
        self.highest_package = max_option(self.highest_package, other.highest_package);
        self.average_package = self.average_package.or(other.average_package);
    }
}

/// Run-level aggregate across all placement-tagged pages and documents.
/// Recomputed per crawl run, never incrementally maintained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStatistics {
    pub salary_figures: Vec<f64>,
    pub company_names: Vec<String>,
    pub student_counts: Vec<u32>,
    pub academic_years: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_package: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_package: Option<f64>,
    pub total_students_placed: u32,
}

impl PlacementStatistics {
    pub fn is_empty(&self) -> bool {
        self.salary_figures.is_empty()
            && self.company_names.is_empty()
            && self.student_counts.is_empty()
            && self.academic_years.is_empty()
    }

    /// Absorb one mined batch into the run aggregate.
    pub fn absorb(&mut self, data: &PlacementData) {
        self.salary_figures.extend(&data.salary_figures);
        for company in &data.companies {
            if !self.company_names.contains(company) {
                self.company_names.push(company.clone());
            }
        }
        self.student_counts.extend(&data.student_counts);
        for year in &data.academic_years {
            if !self.academic_years.contains(year) {
                self.academic_years.push(year.clone());
            }
        }
        self.total_students_placed = self.student_counts.iter().sum();

        let explicit_high = data.highest_package;
        let observed_high = self.salary_figures.iter().cloned().fold(None, max_f64);
        self.highest_package = max_option(max_option(self.highest_package, explicit_high), observed_high);

        self.average_package = data.average_package.or(self.average_package).or_else(|| {
            if self.salary_figures.is_empty() {
                None
            } else {
                Some(self.salary_figures.iter().sum::<f64>() / self.salary_figures.len() as f64)
            }
        });
    }
}

/// Mine placement patterns out of free text.
pub fn mine(text: &str) -> PlacementData {
    let lowered = text.to_lowercase();
    let mut data = PlacementData::default();

    let salary = Regex::new(r"(\d+(?:\.\d+)?)\s*(lpa|lakhs?|crores?|cr)\b").unwrap();
    for cap in salary.captures_iter(&lowered) {
        if let Ok(amount) = cap[1].parse::<f64>() {
            let unit = &cap[2];
            let lpa = if unit.starts_with("cr") {
                amount * 100.0
            } else {
                amount
            };
            data.salary_figures.push(lpa);
        }
    }

    for recruiter in RECOGNIZED_RECRUITERS {
        if lowered.contains(&recruiter.to_lowercase()) && !data.companies.contains(&recruiter.to_string()) {
            data.companies.push((*recruiter).to_string());
        }
    }

    let students =
        Regex::new(r"(\d+)\s*(?:students?|candidates?|scholars?)\s*(?:placed|selected|offered|recruited|hired)")
            .unwrap();
    for cap in students.captures_iter(&lowered) {
        if let Ok(count) = cap[1].parse::<u32>() {
            data.student_counts.push(count);
        }
    }

    let year = Regex::new(r"\b(20\d{2}\s*-\s*\d{2})\b").unwrap();
    for cap in year.captures_iter(&lowered) {
        let normalized = cap[1].split_whitespace().collect::<String>();
        if !data.academic_years.contains(&normalized) {
            data.academic_years.push(normalized);
        }
    }
    let ay = Regex::new(r"\b(?:ay|academic\s*year|batch)\s*[:\-]?\s*(20\d{2})\b").unwrap();
    for cap in ay.captures_iter(&lowered) {
        let year = cap[1].to_string();
        // Skip years already represented by a 20NN-NN span
        if !data.academic_years.iter().any(|y| y.starts_with(&year)) {
            data.academic_years.push(year);
        }
    }

    let percentage = Regex::new(r"(\d+(?:\.\d+)?)\s*%\s*(?:placement|placed)").unwrap();
    for cap in percentage.captures_iter(&lowered) {
        if let Ok(pct) = cap[1].parse::<f32>() {
            data.placement_percentages.push(pct);
        }
    }

    let offers = Regex::new(r"(\d+)\s*offers?\s*(?:received|made|extended)").unwrap();
    for cap in offers.captures_iter(&lowered) {
        if let Ok(count) = cap[1].parse::<u32>() {
            data.offer_counts.push(count);
        }
    }

    let highest = Regex::new(
        r"(?:highest|maximum|top)\s*(?:package|salary|ctc)\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*(lpa|lakhs?|crores?|cr)",
    )
    .unwrap();
    if let Some(cap) = highest.captures(&lowered) {
        if let Ok(amount) = cap[1].parse::<f64>() {
            let lpa = if cap[2].starts_with("cr") { amount * 100.0 } else { amount };
            data.highest_package = Some(lpa);
        }
    }

    let average =
        Regex::new(r"(?:average|avg|mean)\s*(?:package|salary|ctc)\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*(lpa|lakhs?)")
            .unwrap();
    if let Some(cap) = average.captures(&lowered) {
        if let Ok(amount) = cap[1].parse::<f64>() {
            data.average_package = Some(amount);
        }
    }

    data
}

fn max_f64(acc: Option<f64>, value: f64) -> Option<f64> {
    Some(match acc {
        Some(current) if current >= value => current,
        _ => value,
    })
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}
