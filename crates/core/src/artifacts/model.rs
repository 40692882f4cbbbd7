use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::matrix::CsrMatrix;
use crate::errors::ModelError;

/// Ranked item for a user, scored by predicted affinity.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredItem {
    pub code: u32,
    pub score: f32,
}

/// Latent factors of an implicit-feedback ALS model.
///
/// Factor matrices are stored row-major and flattened; `factors` is the shared
/// row width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFactorModel", into = "RawFactorModel")]
pub struct FactorModel {
    factors: usize,
    users: usize,
    items: usize,
    user_factors: Vec<f32>,
    item_factors: Vec<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawFactorModel {
    user_factors: Vec<Vec<f32>>,
    item_factors: Vec<Vec<f32>>,
}

impl FactorModel {
    pub fn new(user_factors: Vec<Vec<f32>>, item_factors: Vec<Vec<f32>>) -> Result<Self, String> {
        let factors = user_factors
            .first()
            .or_else(|| item_factors.first())
            .map(Vec::len)
            .unwrap_or_default();

        if let Some((row, width)) = user_factors
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, width)| *width != factors)
        {
            return Err(format!("user factor row {row} has width {width}, expected {factors}"));
        }
        if let Some((row, width)) = item_factors
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, width)| *width != factors)
        {
            return Err(format!("item factor row {row} has width {width}, expected {factors}"));
        }

        Ok(Self {
            factors,
            users: user_factors.len(),
            items: item_factors.len(),
            user_factors: user_factors.into_iter().flatten().collect(),
            item_factors: item_factors.into_iter().flatten().collect(),
        })
    }

    pub fn users(&self) -> usize {
        self.users
    }

    pub fn items(&self) -> usize {
        self.items
    }

    pub fn factors(&self) -> usize {
        self.factors
    }

    /// Top-`count` items for `user`, skipping items the user already interacted
    /// with in `interactions`. Highest score first; ties keep code order.
    pub fn recommend(
        &self,
        user: usize,
        interactions: &CsrMatrix,
        count: usize,
    ) -> Result<Vec<ScoredItem>, ModelError> {
        if user >= self.users {
            return Err(ModelError::UserOutOfRange { user, users: self.users });
        }
        let consumed: HashSet<u32> = interactions
            .row(user)
            .ok_or(ModelError::MissingInteractionRow { user })?
            .filter(|(_, value)| *value != 0.0)
            .map(|(code, _)| code)
            .collect();

        if count == 0 {
            return Ok(Vec::new());
        }

        let user_row = &self.user_factors[user * self.factors..(user + 1) * self.factors];
        let mut ranked: Vec<ScoredItem> = self
            .item_factors
            .chunks_exact(self.factors.max(1))
            .take(self.items)
            .enumerate()
            .filter(|(item, _)| !consumed.contains(&(*item as u32)))
            .map(|(item, item_row)| ScoredItem {
                code: item as u32,
                score: user_row.iter().zip(item_row).map(|(u, i)| u * i).sum(),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(count);
        Ok(ranked)
    }
}

impl TryFrom<RawFactorModel> for FactorModel {
    type Error = String;

    fn try_from(value: RawFactorModel) -> Result<Self, Self::Error> {
        Self::new(value.user_factors, value.item_factors)
    }
}

impl From<FactorModel> for RawFactorModel {
    fn from(value: FactorModel) -> Self {
        let width = value.factors.max(1);
        let rows = |flat: Vec<f32>, count: usize| -> Vec<Vec<f32>> {
            if value.factors == 0 {
                return vec![Vec::new(); count];
            }
            flat.chunks(width).map(<[f32]>::to_vec).collect()
        };
        Self {
            user_factors: rows(value.user_factors, value.users),
            item_factors: rows(value.item_factors, value.items),
        }
    }
}
