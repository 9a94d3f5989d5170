//! Structured extraction results for a single sequencing report
//!
//! These are the shapes exchanged with the external extraction and
//! classification components. Classification outputs are closed
//! enumerations that parse from their display labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecimenPairError;
use crate::models::record::RawDateTime;

/// One somatic variant row from the report's mutation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SomaticMutation {
    /// Gene symbol (e.g. TP53)
    #[serde(rename = "Gene")]
    pub gene: String,
    /// DNA change (e.g. c.3754C>A)
    #[serde(rename = "DNA")]
    pub dna: String,
    /// Protein change (e.g. p.P1252T)
    #[serde(rename = "Protein")]
    pub protein: String,
    /// Variant location (e.g. Exon 1)
    #[serde(rename = "Location")]
    pub location: String,
    /// Variant allele frequency as printed (e.g. 6%, <5%)
    #[serde(rename = "VAF")]
    pub vaf: String,
    /// Variant type (e.g. Missense)
    #[serde(rename = "Type")]
    pub variant_type: String,
}

/// Raw fields returned by the report extractor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub mrn: String,
    pub mdl_num: String,
    pub cancer_type: Option<String>,
    pub tumor_purity: Option<String>,
    pub tmb: Option<String>,
    pub msi: Option<String>,
    pub copy_number: Option<Vec<String>>,
    pub fusions: Option<Vec<String>>,
    pub somatic_muts: Option<Vec<SomaticMutation>>,
}

/// Whether the sequenced tumour is the primary site or a metastasis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrimarySite {
    /// Primary tumour
    Primary,
    /// Metastatic deposit
    Metastasis,
    /// Synchronous tumours
    Synchronous,
    /// Not determinable from the cancer type
    CannotBeDetermined,
}

impl PrimarySite {
    /// Every variant in display order
    pub const ALL: [Self; 4] = [
        Self::Primary,
        Self::Metastasis,
        Self::Synchronous,
        Self::CannotBeDetermined,
    ];

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Metastasis => "Metastasis",
            Self::Synchronous => "Synchronous",
            Self::CannotBeDetermined => "Cannot be determined",
        }
    }
}

impl FromStr for PrimarySite {
    type Err = SpecimenPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("unknown") {
            return Ok(Self::CannotBeDetermined);
        }
        Self::ALL
            .into_iter()
            .find(|site| site.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SpecimenPairError::Classification(format!("unknown primary site '{s}'")))
    }
}

impl TryFrom<String> for PrimarySite {
    type Error = SpecimenPairError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PrimarySite> for String {
    fn from(site: PrimarySite) -> Self {
        site.label().to_string()
    }
}

impl fmt::Display for PrimarySite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

macro_rules! cancer_categories {
    ($($variant:ident => $label:literal),+ $(,)?) => {
        /// NCCN guideline category a cancer type is filed under
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum CancerCategory {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl CancerCategory {
            /// Every category in guideline order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Display label
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

cancer_categories! {
    AmpullaryAdenocarcinoma => "Ampullary Adenocarcinoma",
    AnalCancer => "Anal Cancer",
    BasalCellSkinCancer => "Basal Cell Skin Cancer",
    BiliaryTractCancers => "Biliary Tract Cancers",
    BladderCancer => "Bladder Cancer",
    BoneCancer => "Bone Cancer",
    BreastCancer => "Breast Cancer",
    CentralNervousSystemCancers => "Central Nervous System Cancers",
    CervicalCancer => "Cervical Cancer",
    ColonCancer => "Colon Cancer",
    DermatofibrosarcomaProtuberans => "Dermatofibrosarcoma Protuberans",
    EsophagealAndEsophagogastricJunctionCancers => "Esophageal and Esophagogastric Junction Cancers",
    GastricCancer => "Gastric Cancer",
    GastrointestinalStromalTumors => "Gastrointestinal Stromal Tumors",
    HeadAndNeckCancers => "Head and Neck Cancers",
    HepatocellularCarcinoma => "Hepatocellular Carcinoma",
    KidneyCancer => "Kidney Cancer",
    CutaneousMelanoma => "Cutaneous Melanoma",
    MerkelCellCarcinoma => "Merkel Cell Carcinoma",
    PeritonealMesothelioma => "Peritoneal Mesothelioma",
    PleuralMesothelioma => "Pleural Mesothelioma",
    Nephroblastoma => "Nephroblastoma (Wilms Tumor)",
    Neuroblastoma => "Neuroblastoma",
    NeuroendocrineAndAdrenalTumors => "Neuroendocrine and Adrenal Tumors",
    NonSmallCellLungCancer => "Non-Small Cell Lung Cancer",
    OccultPrimary => "Occult Primary",
    OvarianCancer => "Ovarian Cancer/Fallopian Tube Cancer/Primary Peritoneal Cancer",
    PancreaticAdenocarcinoma => "Pancreatic Adenocarcinoma",
    PediatricCentralNervousSystemCancers => "Pediatric Central Nervous System Cancers",
    PenileCancer => "Penile Cancer",
    ProstateCancer => "Prostate Cancer",
    RectalCancer => "Rectal Cancer",
    SmallBowelAdenocarcinoma => "Small Bowel Adenocarcinoma",
    SmallCellLungCancer => "Small Cell Lung Cancer",
    SoftTissueSarcoma => "Soft Tissue Sarcoma",
    SquamousCellSkinCancer => "Squamous Cell Skin Cancer",
    TesticularCancer => "Testicular Cancer",
    ThymomasAndThymicCarcinomas => "Thymomas and Thymic Carcinomas",
    ThyroidCarcinoma => "Thyroid Carcinoma",
    UnspecifiedNeoplasm => "Unspecified Neoplasm",
    UterineNeoplasms => "Uterine Neoplasms",
    VaginalCancer => "Vaginal Cancer",
    VulvarCancer => "Vulvar Cancer",
}

impl FromStr for CancerCategory {
    type Err = SpecimenPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                SpecimenPairError::Classification(format!("unknown cancer category '{s}'"))
            })
    }
}

impl TryFrom<String> for CancerCategory {
    type Error = SpecimenPairError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CancerCategory> for String {
    fn from(category: CancerCategory) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for CancerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final structured record for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResults {
    pub mrn: String,
    /// Collection date as it appeared on the paired record
    pub date: Option<RawDateTime>,
    pub mdl_num: String,
    /// Specimen category the report was run on
    pub assay: String,
    pub cancer_type: Option<String>,
    pub primary_met: PrimarySite,
    pub nccn_category: CancerCategory,
    pub tumor_purity: Option<String>,
    pub tmb: Option<String>,
    pub msi: Option<String>,
    pub copy_number: Option<Vec<String>>,
    pub fusions: Option<Vec<String>>,
    pub somatic_muts: Option<Vec<SomaticMutation>>,
}

/// Persisted unit: the report text next to what was extracted from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    pub report: String,
    pub extracts: ExtractionResults,
}
