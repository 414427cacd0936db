//! Guild capability bits.
//!
//! Capabilities are organized into categories:
//! - Guild (bits 0-9): Channel, role, and guild management
//! - Membership (bits 10-13): Member moderation and the administrator bit
//! - Content (bits 14-23): Message and media capabilities
//! - Threads (bits 24-27): Thread capabilities
//! - Voice (bits 28-36): Voice channel capabilities
//! - Apps (bits 37-41): Integrations and applications

use bitflags::bitflags;

bitflags! {
    /// Capability set represented as a 64-bit bitfield.
    ///
    /// Stored as BIGINT in the database for efficient operations. The value
    /// is immutable: every operation returns a new set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u64 {
        // === Guild (bits 0-9) ===
        /// Capability to view a channel and read its message history
        const VIEW_CHANNEL        = 1 << 0;
        /// Capability to create, edit, and delete channels
        const MANAGE_CHANNELS     = 1 << 1;
        /// Capability to create, edit, and delete roles
        const MANAGE_ROLES        = 1 << 2;
        /// Capability to manage custom emoji and stickers
        const MANAGE_EXPRESSIONS  = 1 << 3;
        /// Capability to view the guild audit log
        const VIEW_AUDIT_LOG      = 1 << 4;
        /// Capability to modify guild settings
        const MANAGE_GUILD        = 1 << 5;
        /// Capability to create invite links
        const CREATE_INVITE       = 1 << 6;
        /// Capability to manage (revoke) invite links
        const MANAGE_INVITES      = 1 << 7;
        /// Capability to change own nickname
        const CHANGE_NICKNAME     = 1 << 8;
        /// Capability to change other members' nicknames
        const MANAGE_NICKNAMES    = 1 << 9;

        // === Membership (bits 10-13) ===
        /// Capability to kick members from the guild
        const KICK_MEMBERS        = 1 << 10;
        /// Capability to ban members from the guild
        const BAN_MEMBERS         = 1 << 11;
        /// Capability to timeout members (temporary mute)
        const TIMEOUT_MEMBERS     = 1 << 12;
        /// Grants every capability unconditionally.
        ///
        /// Any role carrying this bit resolves to [`Capabilities::ALL`],
        /// before and regardless of channel overwrites.
        const ADMINISTRATOR       = 1 << 13;

        // === Content (bits 14-23) ===
        /// Capability to send text messages in channels
        const SEND_MESSAGES       = 1 << 14;
        /// Capability to send text-to-speech messages
        const SEND_TTS_MESSAGES   = 1 << 15;
        /// Capability to delete messages from other members
        const MANAGE_MESSAGES     = 1 << 16;
        /// Capability to embed links in messages (auto-preview)
        const EMBED_LINKS         = 1 << 17;
        /// Capability to attach files to messages
        const ATTACH_FILES        = 1 << 18;
        /// Capability to read messages sent before joining
        const READ_MESSAGE_HISTORY = 1 << 19;
        /// Capability to mention @everyone and @here
        const MENTION_EVERYONE    = 1 << 20;
        /// Capability to use emoji from other guilds
        const USE_EXTERNAL_EMOJI  = 1 << 21;
        /// Capability to add reactions to messages
        const ADD_REACTIONS       = 1 << 22;
        /// Capability to use stickers from other guilds
        const USE_EXTERNAL_STICKERS = 1 << 23;

        // === Threads (bits 24-27) ===
        /// Capability to create public threads
        const CREATE_PUBLIC_THREADS  = 1 << 24;
        /// Capability to create private threads
        const CREATE_PRIVATE_THREADS = 1 << 25;
        /// Capability to send messages in threads
        const SEND_MESSAGES_IN_THREADS = 1 << 26;
        /// Capability to manage and archive threads
        const MANAGE_THREADS      = 1 << 27;

        // === Voice (bits 28-36) ===
        /// Capability to connect to voice channels
        const VOICE_CONNECT       = 1 << 28;
        /// Capability to speak in voice channels
        const VOICE_SPEAK         = 1 << 29;
        /// Capability to start screen sharing in voice channels
        const SCREEN_SHARE        = 1 << 30;
        /// Capability to use voice activity detection (vs push-to-talk)
        const USE_VOICE_ACTIVATION = 1 << 31;
        /// Capability to speak at priority volume
        const PRIORITY_SPEAKER    = 1 << 32;
        /// Capability to mute other members in voice channels
        const VOICE_MUTE_OTHERS   = 1 << 33;
        /// Capability to deafen other members in voice channels
        const VOICE_DEAFEN_OTHERS = 1 << 34;
        /// Capability to move members between voice channels
        const VOICE_MOVE_MEMBERS  = 1 << 35;
        /// Capability to request to speak in stage channels
        const REQUEST_TO_SPEAK    = 1 << 36;

        // === Apps (bits 37-41) ===
        /// Capability to use application slash commands
        const USE_APPLICATION_COMMANDS = 1 << 37;
        /// Capability to create, edit, and delete webhooks
        const MANAGE_WEBHOOKS     = 1 << 38;
        /// Capability to create and manage scheduled events
        const MANAGE_EVENTS       = 1 << 39;
        /// Capability to launch embedded voice activities
        const USE_EMBEDDED_ACTIVITIES = 1 << 40;
        /// Capability to view guild analytics
        const VIEW_GUILD_INSIGHTS = 1 << 41;
    }
}

impl Capabilities {
    /// The empty capability set. Identity for [`Capabilities::combine`].
    pub const NONE: Self = Self::empty();

    /// Every defined capability. Result of resolving any administrator.
    pub const ALL: Self = Self::all();

    // === Preset Combinations ===

    /// Default capabilities for the @everyone role.
    pub const EVERYONE_DEFAULT: Self = Self::VIEW_CHANNEL
        .union(Self::CREATE_INVITE)
        .union(Self::CHANGE_NICKNAME)
        .union(Self::SEND_MESSAGES)
        .union(Self::EMBED_LINKS)
        .union(Self::ATTACH_FILES)
        .union(Self::READ_MESSAGE_HISTORY)
        .union(Self::USE_EXTERNAL_EMOJI)
        .union(Self::ADD_REACTIONS)
        .union(Self::USE_EXTERNAL_STICKERS)
        .union(Self::CREATE_PUBLIC_THREADS)
        .union(Self::SEND_MESSAGES_IN_THREADS)
        .union(Self::VOICE_CONNECT)
        .union(Self::VOICE_SPEAK)
        .union(Self::USE_VOICE_ACTIVATION)
        .union(Self::REQUEST_TO_SPEAK)
        .union(Self::USE_APPLICATION_COMMANDS);

    /// Default capabilities for moderators.
    ///
    /// Everyone defaults plus moderation and voice control.
    pub const MODERATOR_DEFAULT: Self = Self::EVERYONE_DEFAULT
        .union(Self::KICK_MEMBERS)
        .union(Self::TIMEOUT_MEMBERS)
        .union(Self::MANAGE_MESSAGES)
        .union(Self::MANAGE_NICKNAMES)
        .union(Self::MANAGE_THREADS)
        .union(Self::MENTION_EVERYONE)
        .union(Self::VIEW_AUDIT_LOG)
        .union(Self::MANAGE_INVITES)
        .union(Self::VOICE_MUTE_OTHERS)
        .union(Self::VOICE_DEAFEN_OTHERS)
        .union(Self::VOICE_MOVE_MEMBERS)
        .union(Self::PRIORITY_SPEAKER);

    // === Database Conversion ===

    /// Create a capability set from a database BIGINT value.
    ///
    /// Safely handles the i64 to u64 conversion required for `PostgreSQL`
    /// compatibility. Unknown bits are silently dropped to stay forward
    /// compatible with rows written by newer versions.
    #[must_use]
    pub const fn from_db(value: i64) -> Self {
        let bits = value as u64;
        Self::from_bits_truncate(bits)
    }

    /// Convert the capability set to a database BIGINT value.
    #[must_use]
    pub const fn to_db(self) -> i64 {
        self.bits() as i64
    }

    // === Capability Checking ===

    /// Check if this set includes the specified capability(ies).
    ///
    /// Requires all bits of `capability` to be present.
    #[must_use]
    pub const fn has(self, capability: Self) -> bool {
        self.contains(capability)
    }

    /// Whether this set carries the administrator bit.
    #[must_use]
    pub const fn is_administrator(self) -> bool {
        self.contains(Self::ADMINISTRATOR)
    }

    // === Set Algebra ===
    //
    // `union`, `intersection`, `difference`, `symmetric_difference`, and
    // `complement` come from the bitflags derive; complement is relative to
    // `ALL`, never an infinite universe.

    /// Return a copy with the given capabilities set or cleared.
    ///
    /// Bits outside `capabilities` are unchanged.
    #[must_use]
    pub const fn with(self, capabilities: Self, enabled: bool) -> Self {
        if enabled {
            self.union(capabilities)
        } else {
            self.difference(capabilities)
        }
    }

    /// Whether every bit of `self` is contained in `other`.
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        other.contains(self)
    }

    /// Whether every bit of `other` is contained in `self`.
    #[must_use]
    pub const fn is_superset(self, other: Self) -> bool {
        self.contains(other)
    }

    /// Subset relation excluding equality.
    #[must_use]
    pub fn is_strict_subset(self, other: Self) -> bool {
        self != other && self.is_subset(other)
    }

    /// Superset relation excluding equality.
    #[must_use]
    pub fn is_strict_superset(self, other: Self) -> bool {
        self != other && self.is_superset(other)
    }

    /// Combine the capability sets of several roles.
    ///
    /// If any operand carries [`Capabilities::ADMINISTRATOR`], the result is
    /// [`Capabilities::ALL`] with no further combination. Otherwise the
    /// result is the bitwise OR of all operands, with [`Capabilities::NONE`]
    /// as the identity for an empty slice.
    #[must_use]
    pub fn combine(sets: &[Self]) -> Self {
        if sets.iter().any(|set| set.is_administrator()) {
            return Self::ALL;
        }
        sets.iter().fold(Self::NONE, |acc, set| acc.union(*set))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Bit Position Tests ===

    #[test]
    fn test_guild_capability_bits() {
        assert_eq!(Capabilities::VIEW_CHANNEL.bits(), 1 << 0);
        assert_eq!(Capabilities::MANAGE_CHANNELS.bits(), 1 << 1);
        assert_eq!(Capabilities::MANAGE_ROLES.bits(), 1 << 2);
        assert_eq!(Capabilities::MANAGE_GUILD.bits(), 1 << 5);
        assert_eq!(Capabilities::MANAGE_NICKNAMES.bits(), 1 << 9);
    }

    #[test]
    fn test_membership_capability_bits() {
        assert_eq!(Capabilities::KICK_MEMBERS.bits(), 1 << 10);
        assert_eq!(Capabilities::BAN_MEMBERS.bits(), 1 << 11);
        assert_eq!(Capabilities::TIMEOUT_MEMBERS.bits(), 1 << 12);
        assert_eq!(Capabilities::ADMINISTRATOR.bits(), 1 << 13);
    }

    #[test]
    fn test_voice_capability_bits() {
        assert_eq!(Capabilities::VOICE_CONNECT.bits(), 1 << 28);
        assert_eq!(Capabilities::PRIORITY_SPEAKER.bits(), 1 << 32);
        assert_eq!(Capabilities::REQUEST_TO_SPEAK.bits(), 1 << 36);
    }

    #[test]
    fn test_no_bit_overlaps() {
        // Combining every flag must equal the sum of their bits.
        let combined: u64 = Capabilities::all()
            .iter()
            .fold(0, |acc, c| acc | c.bits());
        let sum: u64 = Capabilities::all().iter().map(|c| c.bits()).sum();
        assert_eq!(combined, sum, "Some capabilities share the same bit!");
    }

    // === Set Algebra Tests ===

    #[test]
    fn test_union_idempotent() {
        let a = Capabilities::SEND_MESSAGES | Capabilities::VOICE_CONNECT;
        assert_eq!(a.union(a), a);
    }

    #[test]
    fn test_intersection_idempotent() {
        let a = Capabilities::MODERATOR_DEFAULT;
        assert_eq!(a.intersection(a), a);
    }

    #[test]
    fn test_complement_involution() {
        let a = Capabilities::EVERYONE_DEFAULT;
        assert_eq!(a.complement().complement(), a);
    }

    #[test]
    fn test_complement_relative_to_all() {
        assert_eq!(Capabilities::NONE.complement(), Capabilities::ALL);
        assert_eq!(Capabilities::ALL.complement(), Capabilities::NONE);
    }

    #[test]
    fn test_symmetric_difference() {
        let a = Capabilities::SEND_MESSAGES | Capabilities::VOICE_CONNECT;
        let b = Capabilities::VOICE_CONNECT | Capabilities::BAN_MEMBERS;
        let sym = a.symmetric_difference(b);
        assert!(sym.has(Capabilities::SEND_MESSAGES));
        assert!(sym.has(Capabilities::BAN_MEMBERS));
        assert!(!sym.has(Capabilities::VOICE_CONNECT));
    }

    #[test]
    fn test_with_sets_and_clears() {
        let a = Capabilities::SEND_MESSAGES;
        let b = a.with(Capabilities::VOICE_CONNECT, true);
        assert!(b.has(Capabilities::SEND_MESSAGES));
        assert!(b.has(Capabilities::VOICE_CONNECT));

        let c = b.with(Capabilities::SEND_MESSAGES, false);
        assert!(!c.has(Capabilities::SEND_MESSAGES));
        assert!(c.has(Capabilities::VOICE_CONNECT));
    }

    // === Subset / Superset Tests ===

    #[test]
    fn test_subset_and_superset() {
        let small = Capabilities::SEND_MESSAGES;
        let big = Capabilities::SEND_MESSAGES | Capabilities::VOICE_CONNECT;

        assert!(small.is_subset(big));
        assert!(big.is_superset(small));
        assert!(!big.is_subset(small));
    }

    #[test]
    fn test_equal_sets_are_not_strict() {
        let a = Capabilities::EVERYONE_DEFAULT;
        assert!(a.is_subset(a));
        assert!(a.is_superset(a));
        assert!(!a.is_strict_subset(a));
        assert!(!a.is_strict_superset(a));
    }

    #[test]
    fn test_strict_subset() {
        let small = Capabilities::SEND_MESSAGES;
        let big = Capabilities::SEND_MESSAGES | Capabilities::VOICE_CONNECT;
        assert!(small.is_strict_subset(big));
        assert!(big.is_strict_superset(small));
        assert!(!small.is_strict_superset(big));
    }

    // === Combine Tests ===

    #[test]
    fn test_combine_empty_is_none() {
        assert_eq!(Capabilities::combine(&[]), Capabilities::NONE);
    }

    #[test]
    fn test_combine_ors_operands() {
        let combined = Capabilities::combine(&[
            Capabilities::SEND_MESSAGES,
            Capabilities::VOICE_CONNECT,
            Capabilities::KICK_MEMBERS,
        ]);
        assert!(combined.has(Capabilities::SEND_MESSAGES));
        assert!(combined.has(Capabilities::VOICE_CONNECT));
        assert!(combined.has(Capabilities::KICK_MEMBERS));
        assert!(!combined.has(Capabilities::BAN_MEMBERS));
    }

    #[test]
    fn test_combine_administrator_short_circuits() {
        let combined = Capabilities::combine(&[
            Capabilities::SEND_MESSAGES,
            Capabilities::ADMINISTRATOR,
        ]);
        assert_eq!(combined, Capabilities::ALL);
    }

    #[test]
    fn test_combine_administrator_alone() {
        assert_eq!(
            Capabilities::combine(&[Capabilities::ADMINISTRATOR]),
            Capabilities::ALL
        );
    }

    // === Preset Tests ===

    #[test]
    fn test_everyone_default_is_unprivileged() {
        let everyone = Capabilities::EVERYONE_DEFAULT;
        assert!(everyone.has(Capabilities::SEND_MESSAGES));
        assert!(everyone.has(Capabilities::VOICE_CONNECT));
        assert!(!everyone.has(Capabilities::KICK_MEMBERS));
        assert!(!everyone.has(Capabilities::MANAGE_GUILD));
        assert!(!everyone.has(Capabilities::ADMINISTRATOR));
    }

    #[test]
    fn test_moderator_default_extends_everyone() {
        let moderator = Capabilities::MODERATOR_DEFAULT;
        assert!(moderator.is_superset(Capabilities::EVERYONE_DEFAULT));
        assert!(moderator.has(Capabilities::KICK_MEMBERS));
        assert!(moderator.has(Capabilities::MANAGE_MESSAGES));
        assert!(!moderator.has(Capabilities::BAN_MEMBERS));
        assert!(!moderator.has(Capabilities::ADMINISTRATOR));
    }

    // === Database Conversion Tests ===

    #[test]
    fn test_db_roundtrip() {
        let original = Capabilities::SEND_MESSAGES
            | Capabilities::VOICE_CONNECT
            | Capabilities::MANAGE_CHANNELS;
        assert_eq!(Capabilities::from_db(original.to_db()), original);
    }

    #[test]
    fn test_from_db_with_negative_value() {
        // The database may hand back negative values for high bit patterns.
        let caps = Capabilities::from_db(-1);
        assert_eq!(caps, Capabilities::ALL);
    }

    #[test]
    fn test_from_db_truncates_unknown_bits() {
        let db_value: i64 = (1 << 0) | (1 << 62);
        let caps = Capabilities::from_db(db_value);
        assert_eq!(caps, Capabilities::VIEW_CHANNEL);
    }

    // === Serde Tests ===

    #[test]
    fn test_serialize_as_flag_names() {
        let caps = Capabilities::SEND_MESSAGES | Capabilities::VOICE_CONNECT;
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, "\"SEND_MESSAGES | VOICE_CONNECT\"");
    }

    #[test]
    fn test_serde_roundtrip() {
        let original = Capabilities::MODERATOR_DEFAULT;
        let json = serde_json::to_string(&original).unwrap();
        let restored: Capabilities = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    // === Default Tests ===

    #[test]
    fn test_default_is_none() {
        assert_eq!(Capabilities::default(), Capabilities::NONE);
        assert!(Capabilities::default().is_empty());
    }

    #[test]
    fn test_flag_name_enumeration() {
        let caps = Capabilities::SEND_MESSAGES | Capabilities::BAN_MEMBERS;
        let names: Vec<&str> = caps.iter_names().map(|(name, _)| name).collect();
        assert!(names.contains(&"SEND_MESSAGES"));
        assert!(names.contains(&"BAN_MEMBERS"));
        assert_eq!(names.len(), 2);
    }
}
