// Action bitmask consumed by the character state machine

bitflags::bitflags! {
    /// Independent action bits; several may be held at once
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ActionSet: u8 {
        const LEFT   = 1 << 0;
        const RIGHT  = 1 << 1;
        const UP     = 1 << 2;
        const DOWN   = 1 << 3;
        const ATTACK = 1 << 4;
        const BLOCK  = 1 << 5;
    }
}

impl ActionSet {
    /// Any directional bit is held
    pub fn is_moving(self) -> bool {
        self.intersects(Self::LEFT | Self::RIGHT | Self::UP | Self::DOWN)
    }
}
