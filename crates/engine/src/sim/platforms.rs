use serde::Deserialize;
use thiserror::Error;

use super::geometry::{GeometryError, Rect, RectBounds};

/// Display tint for a platform. Carried through for the renderer only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlatformColor(pub [u8; 3]);

impl Default for PlatformColor {
    fn default() -> Self {
        Self([255, 0, 0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformDesc {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    #[serde(default)]
    pub color: PlatformColor,
}

impl PlatformDesc {
    pub fn bounds(&self) -> RectBounds {
        RectBounds {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    pub color: PlatformColor,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform {index} has invalid bounds: {source}")]
    Degenerate {
        index: usize,
        #[source]
        source: GeometryError,
    },
}

/// Static ledge geometry for one session, kept in load order.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
}

impl PlatformRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_descs(descs: &[PlatformDesc]) -> Result<Self, PlatformError> {
        let platforms = descs
            .iter()
            .enumerate()
            .map(|(index, desc)| {
                Rect::from_bounds(desc.bounds())
                    .map(|rect| Platform {
                        rect,
                        color: desc.color,
                    })
                    .map_err(|source| PlatformError::Degenerate { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { platforms })
    }

    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            platforms: rects
                .into_iter()
                .map(|rect| Platform {
                    rect,
                    color: PlatformColor::default(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> PlatformDesc {
        PlatformDesc {
            min_x,
            min_y,
            max_x,
            max_y,
            color: PlatformColor::default(),
        }
    }

    #[test]
    fn load_keeps_order() {
        let registry = PlatformRegistry::from_descs(&[
            desc(-2000.0, -200.0, 50000.0, -100.0),
            desc(0.0, 5.0, 1.0, 6.0),
        ])
        .expect("registry");
        let tops = registry.iter().map(|p| p.rect.top()).collect::<Vec<_>>();
        assert_eq!(tops, vec![-100.0, 6.0]);
    }

    #[test]
    fn degenerate_platform_is_rejected_with_index() {
        let error =
            PlatformRegistry::from_descs(&[desc(0.0, 0.0, 1.0, 1.0), desc(5.0, 0.0, 1.0, 1.0)])
                .expect_err("degenerate");
        match error {
            PlatformError::Degenerate { index, .. } => assert_eq!(index, 1),
        }
    }

    #[test]
    fn desc_parses_flat_bounds_with_optional_color() {
        let parsed: PlatformDesc =
            serde_json::from_str(r#"{"min_x":0,"min_y":-1,"max_x":10,"max_y":0}"#).expect("parse");
        assert_eq!(parsed.bounds().max_x, 10.0);
        assert_eq!(parsed.color, PlatformColor([255, 0, 0]));

        let tinted: PlatformDesc = serde_json::from_str(
            r#"{"min_x":0,"min_y":-1,"max_x":10,"max_y":0,"color":[0,128,0]}"#,
        )
        .expect("parse");
        assert_eq!(tinted.color, PlatformColor([0, 128, 0]));
    }

    #[test]
    fn empty_registry_is_valid() {
        let registry = PlatformRegistry::from_descs(&[]).expect("registry");
        assert!(registry.is_empty());
    }
}
