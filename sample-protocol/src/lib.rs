//! Reference simulator packet layouts.
//!
//! A representative subset of the simulator message table, covering every
//! frequency, every block cardinality and most field types. Tests, benches
//! and the tools binary use it when no protocol file is given.

use schema::{
    FieldType, LengthPrefix, MapBlock, MapField, MapPacket, Protocol, SchemaResult,
};
use wire::Frequency;

pub const START_PING_CHECK: &str = "StartPingCheck";
pub const COMPLETE_PING_CHECK: &str = "CompletePingCheck";
pub const AGENT_UPDATE: &str = "AgentUpdate";
pub const OBJECT_UPDATE_CACHED: &str = "ObjectUpdateCached";
pub const IMPROVED_TERSE_OBJECT_UPDATE: &str = "ImprovedTerseObjectUpdate";
pub const REQUEST_MULTIPLE_OBJECTS: &str = "RequestMultipleObjects";
pub const AVATAR_SIT_RESPONSE: &str = "AvatarSitResponse";
pub const USE_CIRCUIT_CODE: &str = "UseCircuitCode";
pub const CHAT_FROM_VIEWER: &str = "ChatFromViewer";
pub const AGENT_THROTTLE: &str = "AgentThrottle";
pub const OBJECT_SELECT: &str = "ObjectSelect";
pub const SIMULATOR_VIEWER_TIME_MESSAGE: &str = "SimulatorViewerTimeMessage";
pub const ENABLE_SIMULATOR: &str = "EnableSimulator";
pub const SCRIPT_DIALOG: &str = "ScriptDialog";
pub const UUID_NAME_REQUEST: &str = "UUIDNameRequest";
pub const UUID_NAME_REPLY: &str = "UUIDNameReply";

/// Builds the reference protocol table.
pub fn protocol() -> SchemaResult<Protocol> {
    Protocol::new(packets())
}

/// The reference packet layouts, in definition order.
#[must_use]
pub fn packets() -> Vec<MapPacket> {
    vec![
        MapPacket::new(START_PING_CHECK, Frequency::High, 1).block(
            MapBlock::single("PingID")
                .field(u8_field("PingID"))
                .field(MapField::new("OldestUnacked", FieldType::U32)),
        ),
        MapPacket::new(COMPLETE_PING_CHECK, Frequency::High, 2)
            .block(MapBlock::single("PingID").field(u8_field("PingID"))),
        MapPacket::new(AGENT_UPDATE, Frequency::High, 4)
            .zero_coded(true)
            .block(
                MapBlock::single("AgentData")
                    .field(uuid_field("AgentID"))
                    .field(uuid_field("SessionID"))
                    .field(MapField::new("BodyRotation", FieldType::Quaternion))
                    .field(MapField::new("HeadRotation", FieldType::Quaternion))
                    .field(u8_field("State"))
                    .field(vector_field("CameraCenter"))
                    .field(vector_field("CameraAtAxis"))
                    .field(vector_field("CameraLeftAxis"))
                    .field(vector_field("CameraUpAxis"))
                    .field(MapField::new("Far", FieldType::F32))
                    .field(MapField::new("ControlFlags", FieldType::U32))
                    .field(u8_field("Flags")),
            ),
        MapPacket::new(OBJECT_UPDATE_CACHED, Frequency::High, 14)
            .block(region_data())
            .block(
                MapBlock::variable("ObjectData")
                    .field(MapField::new("ID", FieldType::U32))
                    .field(MapField::new("CRC", FieldType::U32))
                    .field(MapField::new("UpdateFlags", FieldType::U32)),
            ),
        MapPacket::new(IMPROVED_TERSE_OBJECT_UPDATE, Frequency::High, 15)
            .block(region_data())
            .block(
                MapBlock::variable("ObjectData")
                    .field(MapField::variable("Data", LengthPrefix::U8))
                    .field(MapField::variable("TextureEntry", LengthPrefix::U16)),
            ),
        MapPacket::new(REQUEST_MULTIPLE_OBJECTS, Frequency::Medium, 3)
            .zero_coded(true)
            .block(agent_data())
            .block(
                MapBlock::variable("ObjectData")
                    .field(u8_field("CacheMissType"))
                    .field(MapField::new("ID", FieldType::U32)),
            ),
        MapPacket::new(AVATAR_SIT_RESPONSE, Frequency::Medium, 21)
            .reliable(true)
            .zero_coded(true)
            .block(MapBlock::single("SitObject").field(uuid_field("ID")))
            .block(
                MapBlock::single("SitTransform")
                    .field(MapField::new("AutoPilot", FieldType::Bool))
                    .field(vector_field("SitPosition"))
                    .field(MapField::new("SitRotation", FieldType::Quaternion))
                    .field(vector_field("CameraEyeOffset"))
                    .field(vector_field("CameraAtOffset"))
                    .field(MapField::new("ForceMouselook", FieldType::Bool)),
            ),
        MapPacket::new(USE_CIRCUIT_CODE, Frequency::Low, 3)
            .reliable(true)
            .block(
                MapBlock::single("CircuitCode")
                    .field(MapField::new("Code", FieldType::U32))
                    .field(uuid_field("SessionID"))
                    .field(uuid_field("ID")),
            ),
        MapPacket::new(CHAT_FROM_VIEWER, Frequency::Low, 80)
            .reliable(true)
            .zero_coded(true)
            .block(agent_data())
            .block(
                MapBlock::single("ChatData")
                    .field(MapField::variable("Message", LengthPrefix::U16))
                    .field(u8_field("Type"))
                    .field(MapField::new("Channel", FieldType::I32)),
            ),
        MapPacket::new(AGENT_THROTTLE, Frequency::Low, 81)
            .reliable(true)
            .zero_coded(true)
            .block(
                MapBlock::single("AgentData")
                    .field(uuid_field("AgentID"))
                    .field(uuid_field("SessionID"))
                    .field(MapField::new("CircuitCode", FieldType::U32)),
            )
            .block(
                MapBlock::single("Throttle")
                    .field(MapField::new("GenCounter", FieldType::U32))
                    .field(MapField::variable("Throttles", LengthPrefix::U8)),
            ),
        MapPacket::new(OBJECT_SELECT, Frequency::Low, 110)
            .reliable(true)
            .zero_coded(true)
            .block(agent_data())
            .block(
                MapBlock::variable("ObjectData")
                    .field(MapField::new("ObjectLocalID", FieldType::U32)),
            ),
        MapPacket::new(SIMULATOR_VIEWER_TIME_MESSAGE, Frequency::Low, 150).block(
            MapBlock::single("TimeInfo")
                .field(MapField::new("UsecSinceStart", FieldType::U64))
                .field(MapField::new("SecPerDay", FieldType::U32))
                .field(MapField::new("SecPerYear", FieldType::U32))
                .field(vector_field("SunDirection"))
                .field(MapField::new("SunPhase", FieldType::F32))
                .field(vector_field("SunAngVelocity")),
        ),
        MapPacket::new(ENABLE_SIMULATOR, Frequency::Low, 151)
            .reliable(true)
            .block(
                MapBlock::single("SimulatorInfo")
                    .field(MapField::new("Handle", FieldType::U64))
                    .field(MapField::new("IP", FieldType::IpAddr))
                    .field(MapField::new("Port", FieldType::IpPort)),
            ),
        MapPacket::new(SCRIPT_DIALOG, Frequency::Low, 190)
            .reliable(true)
            .zero_coded(true)
            .block(
                MapBlock::single("Data")
                    .field(uuid_field("ObjectID"))
                    .field(MapField::variable("FirstName", LengthPrefix::U8))
                    .field(MapField::variable("LastName", LengthPrefix::U8))
                    .field(MapField::variable("ObjectName", LengthPrefix::U8))
                    .field(MapField::variable("Message", LengthPrefix::U16))
                    .field(MapField::new("ChatChannel", FieldType::I32))
                    .field(uuid_field("ImageID")),
            )
            .block(
                MapBlock::variable("Buttons")
                    .field(MapField::variable("ButtonLabel", LengthPrefix::U8)),
            )
            .block(MapBlock::variable("OwnerData").field(uuid_field("OwnerID"))),
        MapPacket::new(UUID_NAME_REQUEST, Frequency::Low, 235)
            .block(MapBlock::variable("UUIDNameBlock").field(uuid_field("ID"))),
        MapPacket::new(UUID_NAME_REPLY, Frequency::Low, 236)
            .reliable(true)
            .block(
                MapBlock::variable("UUIDNameBlock")
                    .field(uuid_field("ID"))
                    .field(MapField::variable("FirstName", LengthPrefix::U8))
                    .field(MapField::variable("LastName", LengthPrefix::U8)),
            ),
    ]
}

fn agent_data() -> MapBlock {
    MapBlock::single("AgentData")
        .field(uuid_field("AgentID"))
        .field(uuid_field("SessionID"))
}

fn region_data() -> MapBlock {
    MapBlock::single("RegionData")
        .field(MapField::new("RegionHandle", FieldType::U64))
        .field(MapField::new("TimeDilation", FieldType::U16))
}

fn uuid_field(name: &str) -> MapField {
    MapField::new(name, FieldType::Uuid)
}

fn u8_field(name: &str) -> MapField {
    MapField::new(name, FieldType::U8)
}

fn vector_field(name: &str) -> MapField {
    MapField::new(name, FieldType::Vector3)
}
