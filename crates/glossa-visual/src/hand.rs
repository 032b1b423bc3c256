//! Hand skeleton topology
//!
//! Recorded pose data follows the 21-landmark hand layout produced by the
//! pose inference service. When a frame has exactly that many landmarks the
//! renderer wires them into a skeleton; otherwise it draws loose points.

/// Hand landmark identifier, in payload order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,

    // Thumb
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,

    // Index finger
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,

    // Middle finger
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,

    // Ring finger
    RingMcp,
    RingPip,
    RingDip,
    RingTip,

    // Pinky
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandJoint {
    /// All joints in payload order
    pub fn all() -> &'static [HandJoint] {
        use HandJoint::*;
        &[
            Wrist, ThumbCmc, ThumbMcp, ThumbIp, ThumbTip, IndexMcp, IndexPip, IndexDip, IndexTip,
            MiddleMcp, MiddlePip, MiddleDip, MiddleTip, RingMcp, RingPip, RingDip, RingTip,
            PinkyMcp, PinkyPip, PinkyDip, PinkyTip,
        ]
    }

    /// Number of joints
    pub fn count() -> usize {
        21
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Landmark whose history is drawn as the motion trail
pub const TRAIL_ANCHOR: HandJoint = HandJoint::Wrist;

/// Number of past frames in the motion trail
pub const TRAIL_LENGTH: usize = 8;

/// Bones of the hand skeleton
pub const HAND_CONNECTIONS: [(HandJoint, HandJoint); 21] = {
    use HandJoint::*;
    [
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        (Wrist, IndexMcp),
        (IndexMcp, IndexPip),
        (IndexPip, IndexDip),
        (IndexDip, IndexTip),
        (IndexMcp, MiddleMcp),
        (MiddleMcp, MiddlePip),
        (MiddlePip, MiddleDip),
        (MiddleDip, MiddleTip),
        (MiddleMcp, RingMcp),
        (RingMcp, RingPip),
        (RingPip, RingDip),
        (RingDip, RingTip),
        (RingMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// Does a frame with this many landmarks form a hand skeleton?
pub fn is_hand_skeleton(landmark_count: usize) -> bool {
    landmark_count == HandJoint::count()
}
