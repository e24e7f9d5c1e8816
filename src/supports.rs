//! Support conditions for truss joints.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::geometry::Direction;

/// Restraint applied to a joint.
///
/// Each kind differs only in how many reaction components it contributes and in
/// which directions they act.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Support {
    /// No restraint.
    #[default]
    Free,
    /// Both translations restrained.
    Pin,
    /// Translation restrained along `direction` only.
    Roller {
        /// Line of action of the single reaction component, vertical when omitted.
        #[serde(default = "Direction::y_axis")]
        direction: Direction,
    },
}

impl Support {
    /// Roller restraining horizontal movement.
    #[must_use]
    pub const fn roller_x() -> Self {
        Self::Roller {
            direction: Direction::x_axis(),
        }
    }

    /// Roller restraining vertical movement.
    #[must_use]
    pub const fn roller_y() -> Self {
        Self::Roller {
            direction: Direction::y_axis(),
        }
    }

    /// Number of reaction unknowns the support contributes.
    #[must_use]
    pub const fn reaction_count(&self) -> usize {
        match self {
            Self::Free => 0,
            Self::Pin => 2,
            Self::Roller { .. } => 1,
        }
    }

    /// Unit directions of the reaction components, in assembly order.
    ///
    /// Returns `None` when a roller direction is zero-length or not finite.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{Direction, Support};
    ///
    /// assert_eq!(Support::Pin.reaction_directions().map(|d| d.len()), Some(2));
    /// let broken = Support::Roller { direction: Direction::new(0.0, 0.0) };
    /// assert!(broken.reaction_directions().is_none());
    /// ```
    #[must_use]
    pub fn reaction_directions(&self) -> Option<Vec<Vector2<f64>>> {
        match self {
            Self::Free => Some(Vec::new()),
            Self::Pin => Some(vec![Vector2::x(), Vector2::y()]),
            Self::Roller { direction } => direction.unit().map(|unit| vec![unit]),
        }
    }

    /// Whether the support contributes any reaction.
    #[must_use]
    pub const fn is_restrained(&self) -> bool {
        !matches!(self, Self::Free)
    }
}
