use crate::bodies::RigidBody;
use crate::collision::{Contact, EdgeId, FeaturePair};
use crate::math::{sign_nonzero, Matrix2, Vector2};

/// Maximum number of contact points between two boxes
pub const MAX_CONTACT_POINTS: usize = 2;

/// A face of box B must beat the current best axis by this relative margin to win
const RELATIVE_TOLERANCE: f32 = 0.95;

/// Absolute part of the axis selection margin, scaled by the face's half extent
const ABSOLUTE_TOLERANCE: f32 = 0.01;

/// The reference face chosen by the separating-axis test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    FaceAX,
    FaceAY,
    FaceBX,
    FaceBY,
}

/// A vertex of the incident edge being clipped, tagged with its feature
#[derive(Debug, Clone, Copy, Default)]
struct ClipVertex {
    v: Vector2,
    fp: FeaturePair,
}

/// Clips a two-point segment against the half-plane `dot(normal, x) <= offset`.
///
/// Returns the surviving points; a crossing segment contributes its
/// intersection point, re-tagged with `clip_edge`.
fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: Vector2,
    offset: f32,
    clip_edge: EdgeId,
) -> ([ClipVertex; 2], usize) {
    let mut v_out = [ClipVertex::default(); 2];
    let mut num_out = 0;

    // Signed distances of the end points to the line
    let distance0 = normal.dot(&v_in[0].v) - offset;
    let distance1 = normal.dot(&v_in[1].v) - offset;

    // Keep points behind the plane
    if distance0 <= 0.0 {
        v_out[num_out] = v_in[0];
        num_out += 1;
    }
    if distance1 <= 0.0 {
        v_out[num_out] = v_in[1];
        num_out += 1;
    }

    // The points are on different sides of the plane
    if distance0 * distance1 < 0.0 && num_out < 2 {
        let interp = distance0 / (distance0 - distance1);
        let v = v_in[0].v + interp * (v_in[1].v - v_in[0].v);

        let fp = if distance0 > 0.0 {
            let mut fp = v_in[0].fp;
            fp.in_edge1 = clip_edge;
            fp.in_edge2 = EdgeId::None;
            fp
        } else {
            let mut fp = v_in[1].fp;
            fp.out_edge1 = clip_edge;
            fp.out_edge2 = EdgeId::None;
            fp
        };

        v_out[num_out] = ClipVertex { v, fp };
        num_out += 1;
    }

    (v_out, num_out)
}

/// Finds the edge of the incident box most anti-parallel to the reference
/// normal and returns its end points in world space.
fn compute_incident_edge(
    h: Vector2,
    pos: Vector2,
    rot: &Matrix2,
    normal: Vector2,
) -> [ClipVertex; 2] {
    // The normal is from the reference box. Convert it to the incident box's
    // frame and flip sign.
    let n = -(rot.transpose() * normal);
    let n_abs = n.abs();

    let vertex = |x: f32, y: f32, in_edge2: EdgeId, out_edge2: EdgeId| ClipVertex {
        v: Vector2::new(x, y),
        fp: FeaturePair::new(EdgeId::None, EdgeId::None, in_edge2, out_edge2),
    };

    let mut c = if n_abs.x > n_abs.y {
        if sign_nonzero(n.x) > 0.0 {
            [
                vertex(h.x, -h.y, EdgeId::E3, EdgeId::E4),
                vertex(h.x, h.y, EdgeId::E4, EdgeId::E1),
            ]
        } else {
            [
                vertex(-h.x, h.y, EdgeId::E1, EdgeId::E2),
                vertex(-h.x, -h.y, EdgeId::E2, EdgeId::E3),
            ]
        }
    } else if sign_nonzero(n.y) > 0.0 {
        [
            vertex(h.x, h.y, EdgeId::E4, EdgeId::E1),
            vertex(-h.x, h.y, EdgeId::E1, EdgeId::E2),
        ]
    } else {
        [
            vertex(-h.x, -h.y, EdgeId::E2, EdgeId::E3),
            vertex(h.x, -h.y, EdgeId::E3, EdgeId::E4),
        ]
    };

    for vertex in &mut c {
        vertex.v = pos + *rot * vertex.v;
    }
    c
}

/// Computes the contact points between two oriented boxes.
///
/// Returns up to [`MAX_CONTACT_POINTS`] contacts whose normal points from
/// `body_a` towards `body_b`. An empty result means the boxes are separated
/// by more than `touching_tolerance`.
pub fn collide(body_a: &RigidBody, body_b: &RigidBody, touching_tolerance: f32) -> Vec<Contact> {
    let h_a = body_a.get_half_extents();
    let h_b = body_b.get_half_extents();

    let pos_a = body_a.get_position();
    let pos_b = body_b.get_position();

    let rot_a = Matrix2::from_angle(body_a.get_rotation());
    let rot_b = Matrix2::from_angle(body_b.get_rotation());

    let rot_a_t = rot_a.transpose();
    let rot_b_t = rot_b.transpose();

    let dp = pos_b - pos_a;
    let d_a = rot_a_t * dp;
    let d_b = rot_b_t * dp;

    // B's axes in A's frame
    let c = rot_a_t * rot_b;
    let abs_c = c.abs();
    let abs_c_t = abs_c.transpose();

    // Box A faces
    let face_a = d_a.abs() - h_a - abs_c * h_b;
    if face_a.x > touching_tolerance || face_a.y > touching_tolerance {
        return Vec::new();
    }

    // Box B faces
    let face_b = d_b.abs() - abs_c_t * h_a - h_b;
    if face_b.x > touching_tolerance || face_b.y > touching_tolerance {
        return Vec::new();
    }

    // Find the best axis, preferring faces of A on near ties
    let mut axis = Axis::FaceAX;
    let mut separation = face_a.x;
    let mut normal = if d_a.x > 0.0 { rot_a.col1 } else { -rot_a.col1 };

    if face_a.y > RELATIVE_TOLERANCE * separation + ABSOLUTE_TOLERANCE * h_a.y {
        axis = Axis::FaceAY;
        separation = face_a.y;
        normal = if d_a.y > 0.0 { rot_a.col2 } else { -rot_a.col2 };
    }

    if face_b.x > RELATIVE_TOLERANCE * separation + ABSOLUTE_TOLERANCE * h_b.x {
        axis = Axis::FaceBX;
        separation = face_b.x;
        normal = if d_b.x > 0.0 { rot_b.col1 } else { -rot_b.col1 };
    }

    if face_b.y > RELATIVE_TOLERANCE * separation + ABSOLUTE_TOLERANCE * h_b.y {
        axis = Axis::FaceBY;
        normal = if d_b.y > 0.0 { rot_b.col2 } else { -rot_b.col2 };
    }

    // Set up the clipping planes of the reference face and the segment to clip
    let (front_normal, front, side_normal, neg_side, pos_side, neg_edge, pos_edge, incident_edge) =
        match axis {
            Axis::FaceAX => {
                let front_normal = normal;
                let side_normal = rot_a.col2;
                let side = pos_a.dot(&side_normal);
                (
                    front_normal,
                    pos_a.dot(&front_normal) + h_a.x,
                    side_normal,
                    -side + h_a.y,
                    side + h_a.y,
                    EdgeId::E3,
                    EdgeId::E1,
                    compute_incident_edge(h_b, pos_b, &rot_b, front_normal),
                )
            }
            Axis::FaceAY => {
                let front_normal = normal;
                let side_normal = rot_a.col1;
                let side = pos_a.dot(&side_normal);
                (
                    front_normal,
                    pos_a.dot(&front_normal) + h_a.y,
                    side_normal,
                    -side + h_a.x,
                    side + h_a.x,
                    EdgeId::E2,
                    EdgeId::E4,
                    compute_incident_edge(h_b, pos_b, &rot_b, front_normal),
                )
            }
            Axis::FaceBX => {
                let front_normal = -normal;
                let side_normal = rot_b.col2;
                let side = pos_b.dot(&side_normal);
                (
                    front_normal,
                    pos_b.dot(&front_normal) + h_b.x,
                    side_normal,
                    -side + h_b.y,
                    side + h_b.y,
                    EdgeId::E3,
                    EdgeId::E1,
                    compute_incident_edge(h_a, pos_a, &rot_a, front_normal),
                )
            }
            Axis::FaceBY => {
                let front_normal = -normal;
                let side_normal = rot_b.col1;
                let side = pos_b.dot(&side_normal);
                (
                    front_normal,
                    pos_b.dot(&front_normal) + h_b.y,
                    side_normal,
                    -side + h_b.x,
                    side + h_b.x,
                    EdgeId::E2,
                    EdgeId::E4,
                    compute_incident_edge(h_a, pos_a, &rot_a, front_normal),
                )
            }
        };

    // Clip to the negative side plane, then the positive one
    let (clip_points1, np) = clip_segment_to_line(&incident_edge, -side_normal, neg_side, neg_edge);
    if np < 2 {
        return Vec::new();
    }

    let (clip_points2, np) = clip_segment_to_line(&clip_points1, side_normal, pos_side, pos_edge);
    if np < 2 {
        return Vec::new();
    }

    // Roundoff can leave both clipped points in front of the reference face
    let flip = matches!(axis, Axis::FaceBX | Axis::FaceBY);
    let mut contacts = Vec::with_capacity(MAX_CONTACT_POINTS);
    for clip in &clip_points2 {
        let separation = front_normal.dot(&clip.v) - front;

        if separation <= touching_tolerance {
            // Slide the point onto the reference face
            let position = clip.v - separation * front_normal;
            let feature = if flip { clip.fp.flipped() } else { clip.fp };
            contacts.push(Contact::new(position, normal, separation, feature));
        }
    }

    contacts
}
