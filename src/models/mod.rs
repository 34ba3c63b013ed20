//! Domain model: segments, methodology branches, occupation codes, and the
//! row types of the input tables.

pub mod methodology;
pub mod occupation;
pub mod rows;
pub mod segment;

pub use methodology::{AttributionSource, GrowthSource, Methodology, ShiftSource};
pub use occupation::{
    EducationGroup, OccLevel, classify_occ_level, group_education, is_grand_total,
};
pub use rows::{
    AttributionShare, IndustryAssignment, IndustryEmployment, SegmentGrowthRate,
    ShiftRecord, StaffingRecord, StageGrowthRate,
};
pub use segment::{
    ALL_SEGMENTS_ID, ALL_SEGMENTS_LABEL, SegmentId, Stage, canonical_label, segment_label,
};
