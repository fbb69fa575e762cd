//! Bearing pressure under the bolt head.
//!
//! Without a shim the head bears directly on the first clamped part over the
//! annulus between head diameter and through hole. With a shim there are two
//! contact faces (head on shim, shim on first part); the lower margin of the
//! two governs.

use crate::analysis::ResolvedJoint;
use crate::units::{Millimeters, Newtons, SqMm};

/// Raw (unclamped) bearing pressure margin for a bolt force `force_n`.
///
/// With `service_temperature` set, the service-temperature materials of shim
/// and first part are used (VDI thermal model only; otherwise room
/// temperature).
pub fn bearing_margin(joint: &ResolvedJoint<'_>, force_n: f64, service_temperature: bool) -> f64 {
    let force = Newtons(force_n);
    let dh = Millimeters(joint.bolt.dh_mm);
    let hole = Millimeters(joint.spec.through_hole_mm);
    let (shim_material, first_part) = joint.bearing_materials(service_temperature);

    match (joint.shim, shim_material) {
        (Some(washer), Some(shim_material)) => {
            let head_on_shim = SqMm::annulus(dh, Millimeters(washer.dmin_mm));
            let shim_on_part = SqMm::annulus(Millimeters(washer.dmaj_mm), hole);
            let mos_shim = shim_material.sig_y_mpa / (force / head_on_shim).value() - 1.0;
            let mos_part = first_part.sig_y_mpa / (force / shim_on_part).value() - 1.0;
            mos_shim.min(mos_part)
        }
        _ => {
            let area = SqMm::annulus(dh, hole);
            first_part.sig_y_mpa / (force / area).value() - 1.0
        }
    }
}
