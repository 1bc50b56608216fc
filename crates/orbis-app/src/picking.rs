//! Pointer picking against the globe and the interactive overlay points.

use glam::{Mat4, Vec3};
use orbis_overlay::{OverlayRecord, PointCloud};
use orbis_render::Ray;
use orbis_sky::GLOBE_RADIUS;

/// Largest ray-to-point distance that still counts as a hit on a point.
pub const POINT_PICK_THRESHOLD: f32 = 0.03;

/// Identifies one record in one overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickKey {
    pub layer: &'static str,
    pub index: usize,
}

/// What the nearest intersection along the pointer ray was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickHit {
    /// The planet or one of its shells blocks the ray first.
    Planet { distance: f32 },
    Overlay { key: PickKey, distance: f32 },
}

impl PickHit {
    pub fn distance(&self) -> f32 {
        match *self {
            Self::Planet { distance } | Self::Overlay { distance, .. } => distance,
        }
    }

    /// The overlay record behind an interactive hit.
    pub fn key(&self) -> Option<PickKey> {
        match *self {
            Self::Overlay { key, .. } => Some(key),
            Self::Planet { .. } => None,
        }
    }
}

/// Nearest hit of `ray` against the globe sphere and each point cloud.
///
/// Cloud positions are globe-local and placed in the world by
/// `earth_world`.
pub fn pick<'a>(
    ray: &Ray,
    earth_world: &Mat4,
    clouds: impl IntoIterator<Item = (&'static str, &'a PointCloud)>,
) -> Option<PickHit> {
    let centre = earth_world.transform_point3(Vec3::ZERO);
    let mut nearest = ray
        .intersect_sphere(centre, GLOBE_RADIUS)
        .map(|distance| PickHit::Planet { distance });

    for (layer, cloud) in clouds {
        for (index, local) in cloud.positions().iter().enumerate() {
            let world = earth_world.transform_point3(*local);
            let Some((miss, t)) = ray.closest_approach(world) else {
                continue;
            };
            if miss > POINT_PICK_THRESHOLD {
                continue;
            }
            let distance = ray.at(t).distance(ray.origin);
            if nearest.is_none_or(|hit| distance < hit.distance()) {
                nearest = Some(PickHit::Overlay {
                    key: PickKey { layer, index },
                    distance,
                });
            }
        }
    }
    nearest
}

/// Change in hover state for a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTransition {
    pub left: Option<PickKey>,
    pub entered: Option<PickKey>,
}

impl HoverTransition {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.entered.is_none()
    }
}

/// Remembers the hovered record across frames so enter and leave are
/// reported once per hover session.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    current: Option<PickKey>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PickKey> {
        self.current
    }

    pub fn update(&mut self, hovered: Option<PickKey>) -> HoverTransition {
        if hovered == self.current {
            return HoverTransition::default();
        }
        let transition = HoverTransition {
            left: self.current,
            entered: hovered,
        };
        self.current = hovered;
        transition
    }

    /// Drop the hovered record, e.g. when its layer is hidden.
    pub fn clear(&mut self) -> HoverTransition {
        self.update(None)
    }
}

/// Look up the record a key refers to among the pickable clouds.
pub fn resolve<'a>(
    key: PickKey,
    mut clouds: impl Iterator<Item = (&'static str, &'a PointCloud)>,
) -> Option<&'a OverlayRecord> {
    clouds
        .find(|(layer, _)| *layer == key.layer)
        .and_then(|(_, cloud)| cloud.record(key.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_geo::geodetic_to_cartesian;
    use orbis_overlay::POINT_RADIUS;

    fn ray_toward(target: Vec3, from_distance: f32) -> Ray {
        let origin = target.normalize() * from_distance;
        Ray {
            origin,
            direction: (target - origin).normalize(),
        }
    }

    fn cloud(points: &[(f32, f32)]) -> PointCloud {
        PointCloud::from_records(
            points
                .iter()
                .map(|&(lat, lon)| OverlayRecord::new(lat, lon))
                .collect(),
        )
    }

    #[test]
    fn test_miss_everything() {
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 5.0),
            direction: Vec3::Z,
        };
        assert_eq!(pick(&ray, &Mat4::IDENTITY, std::iter::empty()), None);
    }

    #[test]
    fn test_globe_hit_is_not_interactive() {
        let ray = ray_toward(Vec3::X, 3.0);
        let hit = pick(&ray, &Mat4::IDENTITY, std::iter::empty());
        assert!(matches!(hit, Some(PickHit::Planet { .. })));
        assert_eq!(hit.and_then(|h| h.key()), None);
        assert!((hit.map(|h| h.distance()).unwrap_or(0.0) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_above_surface_wins_over_globe() {
        let points = cloud(&[(10.0, 20.0)]);
        let target = geodetic_to_cartesian(10.0, 20.0, POINT_RADIUS);
        let ray = ray_toward(target, 3.0);
        let hit = pick(&ray, &Mat4::IDENTITY, [("seismic", &points)]);
        assert_eq!(
            hit.and_then(|h| h.key()),
            Some(PickKey {
                layer: "seismic",
                index: 0
            })
        );
    }

    #[test]
    fn test_far_side_point_is_occluded_by_globe() {
        let points = cloud(&[(0.0, 180.0)]);
        let ray = ray_toward(geodetic_to_cartesian(0.0, 0.0, 1.0), 3.0);
        let hit = pick(&ray, &Mat4::IDENTITY, [("nuclear", &points)]);
        assert!(matches!(hit, Some(PickHit::Planet { .. })));
    }

    #[test]
    fn test_points_follow_the_earth_transform() {
        let points = cloud(&[(0.0, 0.0)]);
        let earth_world = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let world = earth_world.transform_point3(geodetic_to_cartesian(0.0, 0.0, POINT_RADIUS));
        let ray = ray_toward(world, 3.0);
        let hit = pick(&ray, &earth_world, [("conflicts", &points)]);
        assert!(hit.and_then(|h| h.key()).is_some());

        let unrotated = ray_toward(geodetic_to_cartesian(0.0, 0.0, POINT_RADIUS), 3.0);
        let miss = pick(&unrotated, &earth_world, [("conflicts", &points)]);
        assert_eq!(miss.and_then(|h| h.key()), None);
    }

    #[test]
    fn test_nearest_of_two_layers_wins() {
        let near = cloud(&[(0.0, 0.0)]);
        let target = geodetic_to_cartesian(0.0, 0.0, POINT_RADIUS);
        let far = PointCloud::from_records(vec![OverlayRecord::new(0.0, 0.0)]);
        let ray = ray_toward(target, 3.0);
        // Same spot in both clouds: the first one found keeps the hit on a tie.
        let hit = pick(&ray, &Mat4::IDENTITY, [("a", &near), ("b", &far)]);
        assert_eq!(hit.and_then(|h| h.key()).map(|k| k.layer), Some("a"));
    }

    #[test]
    fn test_hover_enter_and_leave_once() {
        let key = PickKey {
            layer: "nuclear",
            index: 3,
        };
        let mut tracker = HoverTracker::new();

        let enter = tracker.update(Some(key));
        assert_eq!(enter.entered, Some(key));
        assert_eq!(enter.left, None);

        for _ in 0..10 {
            assert!(tracker.update(Some(key)).is_empty());
        }

        let leave = tracker.update(None);
        assert_eq!(leave.left, Some(key));
        assert_eq!(leave.entered, None);
        assert!(tracker.update(None).is_empty());
    }

    #[test]
    fn test_hover_switch_reports_both() {
        let a = PickKey {
            layer: "nuclear",
            index: 0,
        };
        let b = PickKey {
            layer: "nuclear",
            index: 1,
        };
        let mut tracker = HoverTracker::new();
        tracker.update(Some(a));
        let switch = tracker.update(Some(b));
        assert_eq!(switch.left, Some(a));
        assert_eq!(switch.entered, Some(b));
        assert_eq!(tracker.current(), Some(b));
    }

    #[test]
    fn test_resolve_finds_record() {
        let points = PointCloud::from_records(vec![
            OverlayRecord::new(1.0, 2.0).with_title("first"),
            OverlayRecord::new(3.0, 4.0).with_title("second"),
        ]);
        let key = PickKey {
            layer: "seismic",
            index: 1,
        };
        let record = resolve(key, [("seismic", &points)].into_iter());
        assert_eq!(record.map(|r| r.title.as_str()), Some("second"));
        assert!(resolve(key, [("other", &points)].into_iter()).is_none());
    }
}
