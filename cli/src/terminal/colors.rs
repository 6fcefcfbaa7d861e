use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 0x5f, g: 0xd7, b: 0xff };
pub const SECONDARY: Color = Color::TrueColor { r: 0xaf, g: 0x87, b: 0xff };
pub const ACCENT: Color = Color::TrueColor { r: 0xff, g: 0xd7, b: 0x5f };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const IPV4_ADDR: Color = Color::TrueColor { r: 0x87, g: 0xd7, b: 0x87 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 0x87, g: 0xaf, b: 0xd7 };

pub const RISK_HIGH: Color = Color::BrightRed;
pub const RISK_MEDIUM: Color = Color::BrightYellow;
pub const RISK_LOW: Color = Color::BrightGreen;
