use nalgebra::{Matrix3, Vector3, Vector4};
use std::f64::consts::FRAC_PI_2;

/// Inertial-to-body rotation matrix for a Z-Y-X Euler angle sequence
/// (roll phi, pitch theta, yaw psi).
pub fn rotation_matrix(phi: f64, theta: f64, psi: f64) -> Matrix3<f64> {
    let (s_phi, c_phi) = phi.sin_cos();
    let (s_theta, c_theta) = theta.sin_cos();
    let (s_psi, c_psi) = psi.sin_cos();

    Matrix3::new(
        c_theta * c_psi,
        c_theta * s_psi,
        -s_theta,
        s_phi * s_theta * c_psi - c_phi * s_psi,
        s_phi * s_theta * s_psi + c_phi * c_psi,
        s_phi * c_theta,
        c_phi * s_theta * c_psi + s_phi * s_psi,
        c_phi * s_theta * s_psi - s_phi * c_psi,
        c_phi * c_theta,
    )
}

/// Convert a (w, x, y, z) quaternion to (roll, pitch, yaw) Euler angles.
/// Pitch is clamped to +-90 deg at the representation singularity.
pub fn euler_from_quaternion(quaternion: &Vector4<f64>) -> Vector3<f64> {
    let (w, x, y, z) = (quaternion[0], quaternion[1], quaternion[2], quaternion[3]);

    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    Vector3::new(roll, pitch, yaw)
}

/// Convert (roll, pitch, yaw) Euler angles to a (w, x, y, z) quaternion.
pub fn quaternion_from_euler(roll: f64, pitch: f64, yaw: f64) -> Vector4<f64> {
    let (sr, cr) = (roll * 0.5).sin_cos();
    let (sp, cp) = (pitch * 0.5).sin_cos();
    let (sy, cy) = (yaw * 0.5).sin_cos();

    Vector4::new(
        cr * cp * cy + sr * sp * sy,
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_matrix_is_orthonormal() {
        let r = rotation_matrix(0.4, -0.3, 1.2);
        assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn euler_quaternion_round_trip() {
        let (roll, pitch, yaw) = (0.3, -0.5, 2.0);
        let quaternion = quaternion_from_euler(roll, pitch, yaw);
        assert_relative_eq!(quaternion.norm(), 1.0, epsilon = 1e-12);
        let angles = euler_from_quaternion(&quaternion);
        assert_relative_eq!(angles[0], roll, epsilon = 1e-12);
        assert_relative_eq!(angles[1], pitch, epsilon = 1e-12);
        assert_relative_eq!(angles[2], yaw, epsilon = 1e-12);
    }

    #[test]
    fn pitch_clamps_at_the_singularity() {
        let quaternion = quaternion_from_euler(0.0, FRAC_PI_2, 0.0);
        let angles = euler_from_quaternion(&quaternion);
        assert_relative_eq!(angles[1], FRAC_PI_2, epsilon = 1e-9);
    }
}
