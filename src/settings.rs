//Fixed identifiers and ordering tables shared by the builders and aggregators.

pub const HIERARCHY_ID_PATH_DELIMITER: &str = "#";

pub const OTHER_X_AXIS_ID: &str = "OTHER_X";
pub const OTHER_X_AXIS_LABEL: &str = "Other";
pub const OTHER_PHENOTYPE_LABEL: &str = "other";
pub const SYNONYMS_TITLE: &str = "synonyms";
pub const END_ORGAN_SUFFIX: &str = " (End Organ)";

pub const CNS_ID: &str = "http://purl.obolibrary.org/obo/UBERON_0001017";
pub const PNS_ID: &str = "http://purl.obolibrary.org/obo/UBERON_0000010";
pub const UNK_ID: &str = "Others_Y_Axis_ID";

/// A fixed top-level node of the origin hierarchy.
///
/// A row is placed under the first root whose predicate accepts the name of the
/// row's first hierarchy level (the empty string when the row has none).
pub struct RootNode {
    pub id: &'static str,
    pub name: &'static str,
    pub is_ancestor: fn(&str) -> bool,
}

fn is_cns(a_l1_name: &str) -> bool {
    a_l1_name == "brain" || a_l1_name == "spinal cord"
}

fn is_pns(a_l1_name: &str) -> bool {
    a_l1_name != "brain" && !a_l1_name.is_empty()
}

fn is_unknown(a_l1_name: &str) -> bool {
    a_l1_name.is_empty()
}

pub const ROOTS: [RootNode; 3] = [
    RootNode {
        id: CNS_ID,
        name: "Central nervous system",
        is_ancestor: is_cns,
    },
    RootNode {
        id: PNS_ID,
        name: "Peripheral nervous system",
        is_ancestor: is_pns,
    },
    RootNode {
        id: UNK_ID,
        name: "Others",
        is_ancestor: is_unknown,
    },
];

///Given the name of a row's first hierarchy level,
///return the id of the root the row belongs to.
pub fn get_root_id(a_l1_name: &str) -> &'static str {
    ROOTS
        .iter()
        .find(|root| (root.is_ancestor)(a_l1_name))
        .map(|root| root.id)
        .unwrap_or(UNK_ID)
}

//anatomical order used to arrange the destinations of the secondary heatmap
pub const DESTINATIONS_ORDER: [&str; 10] = [
    "cervical spinal cord",
    "thoracic spinal cord",
    "lumbar spinal cord",
    "sacral spinal cord",
    "cervical ganglion",
    "lumbar ganglion",
    "thoracic ganglion",
    "pelvic ganglion",
    "ovary",
    "nerve plexus of descending colon",
];

pub const STRINGS_NUMBERS: [&str; 20] = [
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
    "twentieth",
];
