use glam::Vec3;

/// FinishZone is an axis-aligned trigger volume that reports a finish-line
/// crossing at most once per race. The race controller re-arms it on every
/// race start.
#[derive(Debug, Clone)]
pub struct FinishZone {
    center: Vec3,
    half_extents: Vec3,
    has_triggered: bool,
    was_inside: bool,
}

impl FinishZone {
    pub fn new(center: Vec3, half_extents: Vec3) -> FinishZone {
        FinishZone {
            center,
            half_extents,
            has_triggered: false,
            was_inside: false,
        }
    }

    /// reset re-arms the one-shot trigger for a new race. The inside flag is
    /// primed, so a vehicle placed inside the zone does not finish on the
    /// spot; only an outside-to-inside edge fires.
    pub fn reset(&mut self) {
        self.has_triggered = false;
        self.was_inside = true;
    }

    pub fn contains(&self, position: Vec3) -> bool {
        let d = (position - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }

    /// check_crossing returns true exactly once per armed period, on the tick
    /// the vehicle enters the volume.
    pub fn check_crossing(&mut self, position: Vec3) -> bool {
        let inside = self.contains(position);
        let crossed = inside && !self.was_inside && !self.has_triggered;
        self.was_inside = inside;

        if crossed {
            self.has_triggered = true;
        }
        crossed
    }

    pub fn has_triggered(&self) -> bool {
        self.has_triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> FinishZone {
        FinishZone::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 5.0))
    }

    #[test]
    fn fires_once_on_the_entering_edge() {
        let mut zone = zone();
        zone.reset();

        assert!(!zone.check_crossing(Vec3::new(0.0, 0.0, 0.0)));
        assert!(zone.check_crossing(Vec3::new(10.0, 0.0, 0.0)));

        // staying inside or re-entering must not fire again
        assert!(!zone.check_crossing(Vec3::new(10.5, 0.0, 1.0)));
        assert!(!zone.check_crossing(Vec3::new(20.0, 0.0, 0.0)));
        assert!(!zone.check_crossing(Vec3::new(10.0, 0.0, 0.0)));
        assert!(zone.has_triggered());
    }

    #[test]
    fn reset_rearms_and_suppresses_an_in_zone_start() {
        let mut zone = zone();
        zone.reset();
        assert!(zone.check_crossing(Vec3::new(10.0, 0.0, 0.0)));

        zone.reset();
        // starting inside the volume: primed flag swallows the first contact
        assert!(!zone.check_crossing(Vec3::new(10.0, 0.0, 0.0)));

        // a proper lap (leave, come back) fires again
        assert!(!zone.check_crossing(Vec3::new(30.0, 0.0, 0.0)));
        assert!(zone.check_crossing(Vec3::new(10.2, 0.0, -1.0)));
    }
}
