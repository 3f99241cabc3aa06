use std::fmt;

use serde::{Deserialize, Serialize};

/// Description returned for raw codes outside the defined set.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

macro_rules! result_codes {
    ($( $(#[$meta:meta])* $name:ident = $raw:literal => $text:literal, )+) => {
        /// Result codes reported by the audio engine.
        ///
        /// A closed set: backends translate their native failures into one of
        /// these, and every code has a human-readable description.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ResultCode {
            $( $(#[$meta])* $name = $raw, )+
        }

        impl ResultCode {
            /// Every defined code, in engine order.
            pub const ALL: &'static [ResultCode] = &[ $( ResultCode::$name, )+ ];

            /// Look up a code by its raw engine value.
            pub fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $( $raw => Some(Self::$name), )+
                    _ => None,
                }
            }

            pub fn raw(self) -> i32 {
                self as i32
            }

            pub fn description(self) -> &'static str {
                match self {
                    $( Self::$name => $text, )+
                }
            }
        }
    };
}

result_codes! {
    Success = 0 => "Success",
    /// A generic error.
    Error = -1 => "Unspecified Error",
    InvalidArgs = -2 => "Invalid Arguments",
    InvalidOperation = -3 => "Invalid Operation",
    OutOfMemory = -4 => "Out of Memory",
    OutOfRange = -5 => "Out of Range",
    AccessDenied = -6 => "Access Denied",
    DoesNotExist = -7 => "Does Not Exist",
    AlreadyExists = -8 => "Already Exists",
    TooManyOpenFiles = -9 => "Too Many Open Files",
    InvalidFile = -10 => "Invalid File",
    TooBig = -11 => "Too Big",
    PathTooLong = -12 => "Path Too Long",
    NameTooLong = -13 => "Name Too Long",
    NotDirectory = -14 => "Not Directory",
    IsDirectory = -15 => "Is Directory",
    DirectoryNotEmpty = -16 => "Directory Not Empty",
    AtEnd = -17 => "At End",
    NoSpace = -18 => "No Space",
    Busy = -19 => "Busy",
    IoError = -20 => "IO Error",
    Interrupt = -21 => "Interrupt",
    Unavailable = -22 => "Unavailable",
    AlreadyInUse = -23 => "Already In Use",
    BadAddress = -24 => "Bad Address",
    BadSeek = -25 => "Bad Seek",
    BadPipe = -26 => "Bad Pipe",
    Deadlock = -27 => "Deadlock",
    TooManyLinks = -28 => "Too Many Links",
    NotImplemented = -29 => "Not Implemented",
    NoMessage = -30 => "No Message",
    BadMessage = -31 => "Bad Message",
    NoDataAvailable = -32 => "No Data Available",
    InvalidData = -33 => "Invalid Data",
    Timeout = -34 => "Timeout",
    NoNetwork = -35 => "No Network",
    NotUnique = -36 => "Not Unique",
    NotSocket = -37 => "Not Socket",
    NoAddress = -38 => "No Address",
    BadProtocol = -39 => "Bad Protocol",
    ProtocolUnavailable = -40 => "Protocol Unavailable",
    ProtocolNotSupported = -41 => "Protocol Not Supported",
    ProtocolFamilyNotSupported = -42 => "Protocol Family Not Supported",
    AddressFamilyNotSupported = -43 => "Address Family Not Supported",
    SocketNotSupported = -44 => "Socket Not Supported",
    ConnectionReset = -45 => "Connection Reset",
    AlreadyConnected = -46 => "Already Connected",
    NotConnected = -47 => "Not Connected",
    ConnectionRefused = -48 => "Connection Refused",
    NoHost = -49 => "No Host",
    InProgress = -50 => "In Progress",
    Cancelled = -51 => "Cancelled",
    MemoryAlreadyMapped = -52 => "Memory Already Mapped",

    CrcMismatch = -100 => "CRC Mismatch",

    FormatNotSupported = -200 => "Format Not Supported",
    DeviceTypeNotSupported = -201 => "Device Type Not Supported",
    ShareModeNotSupported = -202 => "Share Mode Not Supported",
    NoBackend = -203 => "No Backend",
    NoDevice = -204 => "No Device",
    ApiNotFound = -205 => "API Not Found",
    InvalidDeviceConfig = -206 => "Invalid Device Config",
    Loop = -207 => "Loop",
    BackendNotEnabled = -208 => "Backend Not Enabled",

    DeviceNotInitialized = -300 => "Device Not Initialized",
    DeviceAlreadyInitialized = -301 => "Device Already Initialized",
    DeviceNotStarted = -302 => "Device Not Started",
    DeviceNotStopped = -303 => "Device Not Stopped",

    FailedToInitBackend = -400 => "Failed To Init Backend",
    FailedToOpenBackendDevice = -401 => "Failed To Open Backend Device",
    FailedToStartBackendDevice = -402 => "Failed To Start Backend Device",
    FailedToStopBackendDevice = -403 => "Failed To Stop Backend Device",
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
