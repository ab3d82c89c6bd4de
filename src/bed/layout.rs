//! Column schema of annotated peak rows.

use csv::StringRecord;

use crate::error::Error;

/// Fixed base-peak columns followed by repeating annotation blocks.
///
/// The validity flag shares its column with the first block's chromosome:
/// rows without any overlapping feature carry `UNKNOWN` there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub chrom: usize,
    pub start: usize,
    pub end: usize,
    pub name: usize,
    pub strand: usize,
    pub flag: usize,
    pub first_block: usize,
    pub block_width: usize,
}

/// Cell offsets inside one annotation block.
const BLOCK_START: usize = 1;
const BLOCK_END: usize = 2;
const BLOCK_STRAND: usize = 3;
const BLOCK_NAME: usize = 4;
const BLOCK_TYPE: usize = 5;
const BLOCK_SUB_TYPE: usize = 6;

pub const UNKNOWN_FLAG: &str = "UNKNOWN";

impl RecordLayout {
    /// eCLIP peaks intersected with a feature annotation: ten base columns,
    /// then seven-wide blocks from column 10 on.
    pub const ECLIP: Self = Self {
        chrom: 0,
        start: 1,
        end: 2,
        name: 3,
        strand: 5,
        flag: 10,
        first_block: 10,
        block_width: 7,
    };

    /// Smallest row that still carries every base-peak column. The flag and
    /// the blocks may be missing: such a row is a peak without annotations.
    #[must_use]
    pub fn min_columns(&self) -> usize {
        [self.chrom, self.start, self.end, self.name, self.strand]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Checked once per file against its first row, before decoding starts.
    pub fn validate(&self, first: &StringRecord) -> Result<(), Error> {
        if self.block_width <= BLOCK_SUB_TYPE {
            return Err(Error::Format(format!(
                "annotation blocks must be at least {} columns wide, layout has {}",
                BLOCK_SUB_TYPE + 1,
                self.block_width
            )));
        }
        if first.len() < self.min_columns() {
            return Err(Error::Format(format!(
                "first row has {} columns, expected at least {} base peak columns",
                first.len(),
                self.min_columns()
            )));
        }
        if first.get(self.strand).is_some_and(|s| s != "+" && s != "-") {
            return Err(Error::Format(format!(
                "column {} of the first row is '{}', expected a strand (+/-)",
                self.strand,
                first.get(self.strand).unwrap_or_default()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_unknown(&self, record: &StringRecord) -> bool {
        record.get(self.flag) == Some(UNKNOWN_FLAG)
    }

    /// Every complete annotation block of `record`; a truncated trailing
    /// block ends the sequence.
    pub fn blocks<'r>(
        &self,
        record: &'r StringRecord,
    ) -> impl Iterator<Item = AnnotationBlock<'r>> + use<'r> {
        let width = self.block_width;
        (self.first_block..)
            .step_by(width)
            .map_while(move |offset| AnnotationBlock::at(record, offset, width))
    }
}

/// Seven raw cells describing one overlapping feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationBlock<'r> {
    pub column: usize,
    pub chrom: &'r str,
    pub start: &'r str,
    pub end: &'r str,
    pub strand: &'r str,
    pub name: &'r str,
    pub feature_type: &'r str,
    pub sub_type: &'r str,
}

impl<'r> AnnotationBlock<'r> {
    fn at(record: &'r StringRecord, offset: usize, width: usize) -> Option<Self> {
        if offset + width > record.len() {
            return None;
        }
        let cell = |i: usize| record.get(offset + i).unwrap_or_default();
        Some(Self {
            column: offset,
            chrom: cell(0),
            start: cell(BLOCK_START),
            end: cell(BLOCK_END),
            strand: cell(BLOCK_STRAND),
            name: cell(BLOCK_NAME),
            feature_type: cell(BLOCK_TYPE),
            sub_type: cell(BLOCK_SUB_TYPE),
        })
    }

    /// Blocks padded out by the annotator carry no feature.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chrom.is_empty()
    }
}
