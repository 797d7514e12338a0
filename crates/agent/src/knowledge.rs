//! Static service knowledge: price list, per-generation common issues,
//! and the recommendation bundle derived from them.
//!
//! The tables are compiled in. They change on the workshop's schedule, not
//! the user's, and a config file for them has not been needed yet.

use serde::Serialize;

use rekkari_core::vehicle::VehicleRecord;

/// Service price list, spelled the way the workshop quotes them.
pub const PRICE_LIST: &[(&str, &str)] = &[
    ("Öljynvaihto", "89–149 €"),
    ("Määräaikaishuolto", "249–449 €"),
    ("Jarrupalojen vaihto (etu)", "189–289 €"),
    ("Jarrulevyjen ja -palojen vaihto", "349–549 €"),
    ("Jakohihnan vaihto", "449–799 €"),
    ("Ilmastointihuolto", "99–149 €"),
    ("Tuulilasin vaihto", "299–499 €"),
    ("Katsastustarkastus", "49 €"),
    ("Vianmääritys (OBD)", "69 €"),
];

/// Known weak points per platform generation.
///
/// Keyed by the generation code extracted from the lookup payload. The
/// baseline list applies when the generation is unknown or not tabulated.
const GENERATION_ISSUES: &[(&str, &[&str])] = &[
    (
        "E90",
        &[
            "Vesipumpun ja termostaatin viat (sähköinen vesipumppu)",
            "VANOS-magneettiventtiilien likaantuminen",
            "Kampiakselin takatiivisteen öljyvuoto",
            "Jousijalkojen yläpäiden kuluminen",
        ],
    ),
    (
        "E60",
        &[
            "Jäähdytysjärjestelmän muoviosien haurastuminen",
            "iDrive-järjestelmän ohjelmistoviat",
            "Ilmajousituksen kompressorin kuluminen (Touring)",
        ],
    ),
    (
        "E46",
        &[
            "Takatukivarsien puslat kuluvat nopeasti",
            "Jäähdyttimen paisuntasäiliön halkeilu",
            "Ikkunannostimien viat",
        ],
    ),
    (
        "F30",
        &[
            "Jakoketjun venyminen (N47/B47-diesel)",
            "Ahtimen hukkaportin kolina",
            "Sähköisen ohjaustehostimen viat",
        ],
    ),
];

const BASELINE_ISSUES: &[&str] = &[
    "Jarrujen kuluminen ja jumittavat jarrusatulat",
    "Alustan puslien ja tukivarsien kuluminen",
    "Öljyvuodot venttiilikopan ja kampikammion tiivisteistä",
    "Akun ja laturin heikkeneminen talvikäytössä",
];

fn tabulated_issues(generation: &str) -> Option<&'static [&'static str]> {
    GENERATION_ISSUES
        .iter()
        .find(|(code, _)| *code == generation)
        .map(|(_, issues)| *issues)
}

/// Common issues for a generation code, falling back to the baseline list.
pub fn common_issues(generation: &str) -> &'static [&'static str] {
    tabulated_issues(generation).unwrap_or(BASELINE_ISSUES)
}

/// A suggested service with a quoted price range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub service: String,
    pub price_estimate: String,
    pub reason: String,
}

/// Build the recommendation bundle for a resolved vehicle.
///
/// Always includes the inspection-oriented basics; vehicles with a known
/// problem generation additionally get a diagnostic recommendation naming
/// the first tabulated weak point.
pub fn recommendations_for(vehicle: &VehicleRecord) -> Vec<Recommendation> {
    let mut recommendations = vec![
        Recommendation {
            service: "Määräaikaishuolto".into(),
            price_estimate: "249–449 €".into(),
            reason: "Säännöllinen huolto pitää auton käyntivarmana ja takuun voimassa".into(),
        },
        Recommendation {
            service: "Öljynvaihto".into(),
            price_estimate: "89–149 €".into(),
            reason: "Suositus 12 kk tai 15 000 km välein".into(),
        },
    ];

    if let Some(issues) = tabulated_issues(&vehicle.generation)
        && let Some(first) = issues.first()
    {
        recommendations.push(Recommendation {
            service: "Vianmääritys (OBD)".into(),
            price_estimate: "69 €".into(),
            reason: format!("{}-korimallin tyyppivika: {}", vehicle.generation, first),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekkari_core::vehicle::{DataSource, VehicleRecord};

    fn vehicle(generation: &str) -> VehicleRecord {
        VehicleRecord {
            registration_number: "ABC123".into(),
            make: "BMW".into(),
            model: "3 Series 320i".into(),
            year: "2010".into(),
            generation: generation.into(),
            vin: String::new(),
            found: true,
            data_source: DataSource::Resolved,
        }
    }

    #[test]
    fn tabulated_generation_has_specific_issues() {
        let issues = common_issues("E90");
        assert!(issues.iter().any(|i| i.contains("VANOS")));
    }

    #[test]
    fn unknown_generation_gets_baseline() {
        assert_eq!(common_issues("W204"), BASELINE_ISSUES);
        assert_eq!(common_issues(""), BASELINE_ISSUES);
    }

    #[test]
    fn known_generation_adds_diagnostic_recommendation() {
        let recs = recommendations_for(&vehicle("E90"));
        assert_eq!(recs.len(), 3);
        assert!(recs[2].reason.contains("E90"));
    }

    #[test]
    fn unknown_generation_keeps_basics_only() {
        let recs = recommendations_for(&vehicle(""));
        assert_eq!(recs.len(), 2);
        let recs = recommendations_for(&vehicle("W204"));
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn recommendation_serializes_camel_case() {
        let recs = recommendations_for(&vehicle("E90"));
        let json = serde_json::to_value(&recs).unwrap();
        assert!(json[0]["priceEstimate"].is_string());
    }
}
