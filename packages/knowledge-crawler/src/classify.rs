//! Weighted keyword classification.
//!
//! One static table drives both the pre-fetch link heuristic (anchor text +
//! URL pattern, used for frontier budgeting) and the post-fetch content
//! scores, so link priorities and page priorities agree.

use std::collections::BTreeMap;

use crate::types::CategoryScore;

/// A category with its static priority weight (0–100) and keyword list.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    pub weight: u32,
    pub keywords: &'static [&'static str],
}

/// Weight at or above which links get the large follow budget.
pub const HIGH_PRIORITY_WEIGHT: u32 = 90;
/// Weight at or above which links get the medium follow budget.
pub const MEDIUM_PRIORITY_WEIGHT: u32 = 75;

/// The full category table. Placement pages dominate everything else.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "placements",
        weight: 95,
        keywords: &[
            "placement", "recruit", "recruiter", "career", "campus placement", "tpo",
            "training and placement", "internship", "package", "lpa", "ctc", "offer",
            "hired", "salary", "stipend", "drive", "corporate", "employer",
        ],
    },
    Category {
        name: "admissions",
        weight: 90,
        keywords: &[
            "admission", "intake", "eligibility", "entrance", "apply", "enroll",
            "cutoff", "scholarship", "how-to-apply", "fee structure",
        ],
    },
    Category {
        name: "autonomous",
        weight: 85,
        keywords: &["autonomous", "autonomy", "regulation", "syllabus", "curriculum"],
    },
    Category {
        name: "hostel",
        weight: 80,
        keywords: &["hostel", "accommodation", "residence", "dormitory", "mess"],
    },
    Category {
        name: "faculty",
        weight: 78,
        keywords: &["faculty", "professor", "staff", "hod", "faculty-profile", "teachers"],
    },
    Category {
        name: "circulars",
        weight: 75,
        keywords: &["circular", "notification", "notice", "announcement"],
    },
    Category {
        name: "academics",
        weight: 60,
        keywords: &["course", "program", "semester", "credit", "academic calendar", "department"],
    },
    Category {
        name: "examinations",
        weight: 55,
        keywords: &["exam", "assessment", "evaluation", "mid-term", "internal", "viva", "results"],
    },
    Category {
        name: "events",
        weight: 50,
        keywords: &["event", "workshop", "seminar", "conference", "fest", "symposium", "competition"],
    },
    Category {
        name: "facilities",
        weight: 45,
        keywords: &["library", "laboratory", "canteen", "sports", "infrastructure", "facility"],
    },
    Category {
        name: "contact",
        weight: 30,
        keywords: &["contact", "phone", "address", "location", "principal", "office"],
    },
    Category {
        name: "holidays",
        weight: 25,
        keywords: &["holiday", "vacation", "break", "reopen", "closed"],
    },
];

/// Score page content against every category.
///
/// `score = body occurrences + 3 × title occurrences`; a category is
/// attached only when its score is positive. Confidence saturates at a
/// score of 10.
pub fn classify(title: &str, text: &str) -> BTreeMap<String, CategoryScore> {
    let title = title.to_lowercase();
    let text = text.to_lowercase();

    let mut result = BTreeMap::new();
    for category in CATEGORIES {
        let mut score = 0u32;
        let mut matched = Vec::new();

        for keyword in category.keywords {
            let in_body = count_occurrences(&text, keyword);
            let in_title = count_occurrences(&title, keyword);
            if in_body + in_title > 0 {
                matched.push((*keyword).to_string());
            }
            score += in_body + 3 * in_title;
        }

        if score > 0 {
            result.insert(
                category.name.to_string(),
                CategoryScore {
                    score,
                    matched_keywords: matched,
                    confidence: (score as f32 / 10.0).min(1.0),
                },
            );
        }
    }
    result
}

/// Pre-fetch priority of a link from its target URL and anchor context.
///
/// Returns the maximum matched category weight, 0 when nothing matches.
/// The same function scores a fetched page from its URL and title, so the
/// page's `priority_score` and the weight its inbound link was budgeted
/// under are consistent.
pub fn link_priority(url: &str, anchor_context: &str) -> u32 {
    let haystack = format!("{} {}", url, anchor_context).to_lowercase();
    CATEGORIES
        .iter()
        .filter(|c| c.keywords.iter().any(|k| haystack.contains(k)))
        .map(|c| c.weight)
        .max()
        .unwrap_or(0)
}

/// The highest-scoring attached category, used for the report's
/// category breakdown.
pub fn primary_category(categories: &BTreeMap<String, CategoryScore>) -> Option<&str> {
    categories
        .iter()
        .max_by_key(|(_, s)| s.score)
        .map(|(name, _)| name.as_str())
}

/// Static weight of a category by name.
pub fn category_weight(name: &str) -> Option<u32> {
    CATEGORIES.iter().find(|c| c.name == name).map(|c| c.weight)
}

fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    haystack.matches(needle).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_matches_weigh_triple() {
        let scores = classify("Placement Drive 2025", "welcome to our college");
        let placements = scores.get("placements").unwrap();
        // "placement" and "drive" in title, nothing in body
        assert_eq!(placements.score, 6);
    }

    #[test]
    fn test_score_counts_occurrences_not_presence() {
        let one = classify("", "placement cell");
        let three = classify("", "placement placement placement cell");
        assert!(three.get("placements").unwrap().score > one.get("placements").unwrap().score);
    }

    #[test]
    fn test_monotonicity_of_added_occurrences() {
        let base = "admission process for the new batch";
        let before = classify("", base).get("admissions").unwrap().score;
        let after = classify("", &format!("{base} admission"))
            .get("admissions")
            .unwrap()
            .score;
        assert!(after >= before);
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_unmatched_categories_absent() {
        let scores = classify("Hostel Rules", "hostel accommodation details");
        assert!(scores.contains_key("hostel"));
        assert!(!scores.contains_key("placements"));
    }

    #[test]
    fn test_confidence_saturates_at_one() {
        let text = "placement ".repeat(50);
        let scores = classify("", &text);
        let placements = scores.get("placements").unwrap();
        assert!((placements.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_multiple_categories_attach_independently() {
        let scores = classify(
            "Admissions and Placements",
            "admission enquiry, placement statistics",
        );
        assert!(scores.contains_key("admissions"));
        assert!(scores.contains_key("placements"));
    }

    #[test]
    fn test_link_priority_from_url_pattern() {
        assert_eq!(
            link_priority("https://college.edu/training-and-placement", ""),
            95
        );
        assert_eq!(link_priority("https://college.edu/hostel-facility", ""), 80);
        assert_eq!(link_priority("https://college.edu/gallery", "photo gallery"), 0);
    }

    #[test]
    fn test_link_priority_takes_maximum_weight() {
        // Matches both placements (95) and admissions (90)
        let priority = link_priority("https://college.edu/admission", "placement record");
        assert_eq!(priority, 95);
    }

    #[test]
    fn test_primary_category_picks_top_score() {
        let scores = classify("", "placement placement placement admission");
        assert_eq!(primary_category(&scores), Some("placements"));
    }
}
