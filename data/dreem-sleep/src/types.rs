use serde::{Deserialize, Serialize};

/// Sleep stage of a 30 second window, encoded the way `train_y.csv` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SleepStage {
    Wake,
    N1,
    N2,
    N3,
    Rem,
}

impl SleepStage {
    pub const ALL: [SleepStage; 5] = [
        SleepStage::Wake,
        SleepStage::N1,
        SleepStage::N2,
        SleepStage::N3,
        SleepStage::Rem,
    ];

    pub fn as_class(self) -> usize {
        match self {
            Self::Wake => 0,
            Self::N1 => 1,
            Self::N2 => 2,
            Self::N3 => 3,
            Self::Rem => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wake => "wake",
            Self::N1 => "n1",
            Self::N2 => "n2",
            Self::N3 => "n3",
            Self::Rem => "rem",
        }
    }
}

impl TryFrom<u8> for SleepStage {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SleepStage::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown sleep stage code {value}, expected 0..=4"))
    }
}

impl From<SleepStage> for u8 {
    fn from(stage: SleepStage) -> u8 {
        stage.as_class() as u8
    }
}

/// One labelled window. `signals` holds one row per kept channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DreemItem {
    pub id: i64,
    pub signals: Vec<Vec<f32>>,
    pub stage: SleepStage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_codes_follow_csv_encoding() {
        for (code, stage) in SleepStage::ALL.iter().enumerate() {
            assert_eq!(SleepStage::try_from(code as u8).unwrap(), *stage);
            assert_eq!(stage.as_class(), code);
        }
    }

    #[test]
    fn unknown_stage_code_is_rejected() {
        let err = SleepStage::try_from(5).unwrap_err();
        assert!(err.to_string().contains("unknown sleep stage code 5"));
    }
}
