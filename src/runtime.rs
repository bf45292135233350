// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphMode {
    Unicode,
    Ascii,
}

/// Semantic roles the renderer paints with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Cloud,
    CloudDark,
    CloudLit,
    CloudLitMedium,
    Bolt,
    BoltBright,
    Glow,
    GlowMedium,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Cloud,
        Role::CloudDark,
        Role::CloudLit,
        Role::CloudLitMedium,
        Role::Bolt,
        Role::BoltBright,
        Role::Glow,
        Role::GlowMedium,
    ];
}
