//! Quest catalog types and the built-in catalog definition.

use serde::{Deserialize, Serialize};

use farmstellar_core::QuestId;

/// A unit of learning content with ordered stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub xp_reward: i32,
    pub stages: Vec<QuestStage>,
    pub active: bool,
}

/// One stage of a quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestStage {
    pub title: String,
    pub instructions: String,
}

/// The built-in quest catalog, used to seed the `quests` table.
///
/// Ids here must stay in sync with the XP reward table in the progress
/// service.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn builtin_catalog() -> Vec<Quest> {
    fn quest(
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        xp_reward: i32,
        stages: &[(&str, &str)],
    ) -> Quest {
        Quest {
            // Catalog ids are static literals; parse cannot fail on them.
            id: QuestId::parse(id).unwrap_or_else(|_| unreachable!("invalid catalog id: {id}")),
            title: title.to_owned(),
            description: description.to_owned(),
            category: category.to_owned(),
            xp_reward,
            stages: stages
                .iter()
                .map(|(t, i)| QuestStage {
                    title: (*t).to_owned(),
                    instructions: (*i).to_owned(),
                })
                .collect(),
            active: true,
        }
    }

    vec![
        quest(
            "soil_scout",
            "Soil Scout",
            "Learn to read your soil: texture, colour, and life.",
            "soil",
            10,
            &[
                ("Dig a test pit", "Dig a small pit and note the soil layers you see."),
                ("Texture test", "Roll a moist soil ball and classify it as sand, loam, or clay."),
            ],
        ),
        quest(
            "crop_quest",
            "Crop Quest",
            "Plan a season around one main crop and its companions.",
            "crops",
            75,
            &[
                ("Pick your crop", "Choose a main crop suited to your region and season."),
                ("Companion plan", "List two companion plants and where they will go."),
                ("Sowing calendar", "Write down sowing and expected harvest dates."),
            ],
        ),
        quest(
            "compost_kickoff",
            "Compost Kickoff",
            "Start a compost pile from farm and kitchen waste.",
            "soil",
            40,
            &[
                ("Collect materials", "Gather greens and browns in roughly equal volume."),
                ("Build the pile", "Layer the materials and moisten each layer."),
            ],
        ),
        quest(
            "zero_waste",
            "Zero Waste Farm",
            "Route every waste stream on the farm back into production.",
            "sustainability",
            85,
            &[
                ("Waste audit", "List everything the farm throws away in a week."),
                ("Reuse plan", "Assign each waste stream a reuse or composting route."),
            ],
        ),
        quest(
            "mini_garden",
            "Mini Garden",
            "Grow a small intensive vegetable bed near the house.",
            "crops",
            100,
            &[
                ("Prepare the bed", "Mark out and double-dig a one-by-two metre bed."),
                ("Plant", "Sow three quick vegetables in rows."),
                ("First harvest", "Record what you harvested and when."),
            ],
        ),
        quest(
            "mulch_master",
            "Mulch Master",
            "Cover bare soil to hold water and feed soil life.",
            "soil",
            60,
            &[
                ("Source mulch", "Collect straw, leaves, or crop residue."),
                ("Apply", "Spread a hand-deep layer around standing crops."),
            ],
        ),
        quest(
            "boll_keeper",
            "Boll Keeper",
            "Protect a cotton crop through square and boll formation.",
            "crops",
            150,
            &[
                ("Scout weekly", "Walk the field weekly and count damaged squares."),
                ("Threshold check", "Decide on intervention only past the damage threshold."),
            ],
        ),
        quest(
            "coconut_basin",
            "Coconut Basin",
            "Build water-harvesting basins around coconut palms.",
            "water",
            140,
            &[
                ("Shape the basin", "Form a circular basin at the drip line of each palm."),
                ("Mulch the basin", "Fill the basin with husk and dry leaves."),
            ],
        ),
        quest(
            "coconut_bioenzyme",
            "Coconut Bioenzyme",
            "Ferment a bioenzyme from coconut and citrus waste.",
            "inputs",
            180,
            &[
                ("Mix", "Combine peels, jaggery, and water in a sealed drum."),
                ("Ferment", "Burp the drum weekly and note the smell changing."),
                ("Use", "Dilute and apply to a test row."),
            ],
        ),
        quest(
            "rust_shield",
            "Rust Shield",
            "Defend coffee plants against leaf rust without synthetics.",
            "crops",
            160,
            &[
                ("Identify", "Photograph undersides of leaves with orange dust."),
                ("Prune for airflow", "Open the canopy where rust pressure is highest."),
            ],
        ),
        quest(
            "biodiversity_strip",
            "Biodiversity Strip",
            "Plant a flowering strip to house predators and pollinators.",
            "sustainability",
            190,
            &[
                ("Choose species", "Pick five locally flowering species."),
                ("Plant the strip", "Plant a strip along one field edge."),
            ],
        ),
        quest(
            "rainwater_hero",
            "Rainwater Hero",
            "Capture roof and field runoff for the dry season.",
            "water",
            185,
            &[
                ("Map runoff", "Sketch where water flows and pools in heavy rain."),
                ("Build storage", "Direct one roof or bund into a storage structure."),
            ],
        ),
        quest(
            "biochar_maker",
            "Biochar Maker",
            "Turn woody waste into charged biochar for the soil.",
            "soil",
            200,
            &[
                ("Burn", "Char woody waste in a low-oxygen pit or drum."),
                ("Charge", "Soak the char in compost tea or slurry."),
                ("Apply", "Work the charged char into one bed."),
            ],
        ),
        quest(
            "jeevamrutham",
            "Jeevamrutham",
            "Brew and apply the classic microbial culture.",
            "inputs",
            150,
            &[
                ("Brew", "Mix dung, urine, jaggery, gram flour, and soil in water."),
                ("Apply", "Stir twice daily and apply within a week."),
            ],
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = builtin_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|q| q.id.as_str()).collect();
        ids.sort_unstable();
        let len = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn test_catalog_rewards_positive() {
        for quest in builtin_catalog() {
            assert!(quest.xp_reward > 0, "{} has no reward", quest.id);
            assert!(!quest.stages.is_empty(), "{} has no stages", quest.id);
        }
    }
}
