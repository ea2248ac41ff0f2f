//! Built-in line rules for Objective-C headers and implementation files.

use regex::Regex;

use super::pattern::PatternLineRule;
use super::{compile, quote, LineRule, RuleError};

/// System frameworks that should be pulled in with `@import`.
const FRAMEWORKS: &[&str] = &[
    "Accelerate", "Accounts", "AddressBook", "AddressBookUI", "AdSupport", "Appsee",
    "AssetsLibrary", "AudioToolbox", "AudioUnit", "AVFoundation", "AVKit", "CFNetwork",
    "CloudKit", "CoreAudio", "CoreBluetooth", "CoreData", "CoreFoundation", "CoreGraphics",
    "CoreImage", "CoreLocation", "CoreMedia", "CoreMIDI", "CoreMotion", "CoreTelephony",
    "CoreText", "CoreVideo", "Darwin", "Dispatch", "EventKit", "EventKitUI",
    "ExternalAccessory", "Foundation", "GameController", "GameKit", "GLKit", "GSS", "HealthKit",
    "HomeKit", "iAd", "ImageIO", "JavaScriptCore", "LocalAuthentication", "MachO", "MapKit",
    "MediaAccessibility", "MediaPlayer", "MediaToolbox", "MessageUI", "Metal",
    "MobileCoreServices", "MultipeerConnectivity", "NetworkExtension", "NewsstandKit",
    "NotificationCenter", "ObjectiveC", "OpenAL", "OpenGLES", "PassKit", "Photos", "PhotosUI",
    "PushKit", "QuartzCore", "QuickLook", "SafariServices", "SceneKit", "Security", "Social",
    "SpriteKit", "StoreKit", "SystemConfiguration", "Twitter", "UIKit", "VideoToolbox",
    "WatchKit", "WebKit",
];

pub const DEFAULT_MAX_LINE_LENGTH: usize = 160;

pub fn bool_getter() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("bool-getter", r"^@property.*BOOL", "needs a getter set?")?.unless("getter")
}

pub fn comment() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("comment", r"^//", "did you mean to leave this comment?")
}

pub fn constant_first() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("constant-first", r" == ([0-9]+|[A-Z]{3})", "Constant first?")
}

/// `[obj setThing:]` style sends where dot notation reads better.
pub fn dot_notation() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("dot-notation", r"[\w|\]] \w+\]", "Dot notation?")
}

pub fn inferred_block_return() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new(
        "inferred-block-return",
        r"\^\w+\(",
        "can this return type be inferred?",
    )
}

pub fn first_object() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("first-object", r"\[0\]", "firstObject?")
}

pub fn weak_self_block() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new(
        "weak-self-block",
        r"weakSelf\.\S*\(.*\)",
        "using weakSelf with a block?",
    )
}

pub fn uicolor() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("uicolor", "UIColor", "is there a colour defined for this?")?
        .unless("pbx_|clearColor")
}

pub fn framework_import() -> Result<PatternLineRule, RuleError> {
    let names: Vec<String> = FRAMEWORKS.iter().map(|name| regex::escape(name)).collect();
    let pattern = format!("#import <(?:{})", names.join("|"));
    PatternLineRule::new("framework-import", &pattern, "@import?")
}

pub fn space_before_semicolon() -> Result<PatternLineRule, RuleError> {
    PatternLineRule::new("space-before-semicolon", r"\s;", "extra space?")
}

/// Flags lines longer than `max` characters, terminator included.
///
/// Looks at any extension containing `h` or `m`, so `.mm` and `.hpp` are
/// checked as well.
#[derive(Debug, Clone)]
pub struct LineLengthRule {
    max: usize,
}

impl LineLengthRule {
    pub fn new(max: usize) -> LineLengthRule {
        LineLengthRule { max }
    }
}

impl LineRule for LineLengthRule {
    fn id(&self) -> &str {
        "line-length"
    }

    fn applies_to(&self, extension: &str) -> bool {
        extension.contains(['h', 'm'])
    }

    fn matches(&self, line: &str) -> bool {
        line.chars().count() > self.max
    }

    fn describe(&self, line: &str) -> String {
        quote(line, "does this need shortening?")
    }
}

/// Flags runs of two or more spaces between tokens, except where they line
/// up an `=` or sit in a property declaration.
#[derive(Debug, Clone)]
pub struct ExtraSpaceRule {
    spaces: Regex,
    aligned_equals: Regex,
    property: Regex,
}

impl ExtraSpaceRule {
    pub fn new() -> Result<ExtraSpaceRule, RuleError> {
        Ok(ExtraSpaceRule {
            spaces: compile("extra-space", r"[ \t]{2,}")?,
            aligned_equals: compile("extra-space", r"\s\s=")?,
            property: compile("extra-space", r"^@property")?,
        })
    }
}

impl ExtraSpaceRule {
    /// Runs of two or more spaces with a non-space character on both sides.
    fn gap_count(&self, line: &str) -> usize {
        let solid = |c: Option<char>| c.is_some_and(|c| !c.is_whitespace());
        self.spaces
            .find_iter(line)
            .filter(|run| {
                solid(line[..run.start()].chars().next_back()) && solid(line[run.end()..].chars().next())
            })
            .count()
    }
}

impl LineRule for ExtraSpaceRule {
    fn id(&self) -> &str {
        "extra-space"
    }

    fn matches(&self, line: &str) -> bool {
        let gaps = self.gap_count(line);
        let aligned = self.aligned_equals.find_iter(line).count();
        gaps > aligned && !self.property.is_match(line)
    }

    fn describe(&self, line: &str) -> String {
        quote(line, "extra spacing?")
    }
}

/// `NSString` and block properties should be declared `copy`.
#[derive(Debug, Clone)]
pub struct CopyPropertyRule {
    string_property: Regex,
    block_property: Regex,
}

impl CopyPropertyRule {
    pub fn new() -> Result<CopyPropertyRule, RuleError> {
        Ok(CopyPropertyRule {
            string_property: compile("copy-property", r"^@property.*NSString")?,
            block_property: compile("copy-property", r"^@property.*\^")?,
        })
    }
}

impl LineRule for CopyPropertyRule {
    fn id(&self) -> &str {
        "copy-property"
    }

    fn matches(&self, line: &str) -> bool {
        let candidate = self.string_property.is_match(line) || self.block_property.is_match(line);
        candidate && !line.contains("copy")
    }

    fn describe(&self, line: &str) -> String {
        quote(line, "should you be using copy?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_getter() {
        let rule = bool_getter().unwrap();
        assert!(rule.matches("@property (nonatomic, assign) BOOL editing;\n"));
        assert!(!rule.matches("@property (nonatomic, getter=isEditing) BOOL editing;\n"));
        assert!(!rule.matches("    BOOL editing = NO;\n"));
        assert_eq!(
            rule.describe("@property (nonatomic) BOOL editing;\n"),
            "\"@property (nonatomic) BOOL editing;\", needs a getter set?"
        );
    }

    #[test]
    fn test_comment_only_at_line_start() {
        let rule = comment().unwrap();
        assert!(rule.matches("// debug only\n"));
        assert!(!rule.matches("    x = 1; // trailing\n"));
    }

    #[test]
    fn test_constant_first() {
        let rule = constant_first().unwrap();
        assert!(rule.matches("if (count == 0) {\n"));
        assert!(rule.matches("if (state == ABC) {\n"));
        assert!(!rule.matches("if (0 == count) {\n"));
    }

    #[test]
    fn test_dot_notation() {
        let rule = dot_notation().unwrap();
        assert!(rule.matches("    [self reload];\n"));
        assert!(rule.matches("    [[self view] layoutIfNeeded];\n"));
        assert!(!rule.matches("    [self setTitle:title];\n"));
    }

    #[test]
    fn test_inferred_block_return() {
        let rule = inferred_block_return().unwrap();
        assert!(rule.matches("    [items map:^BOOL(id item) {\n"));
        assert!(!rule.matches("    [items map:^(id item) {\n"));
    }

    #[test]
    fn test_weak_self_block() {
        let rule = weak_self_block().unwrap();
        assert!(rule.matches("    weakSelf.completion(result);\n"));
        assert!(!rule.matches("    [weakSelf reload];\n"));
    }

    #[test]
    fn test_uicolor() {
        let rule = uicolor().unwrap();
        assert!(rule.matches("view.backgroundColor = [UIColor whiteColor];\n"));
        assert!(!rule.matches("view.backgroundColor = [UIColor clearColor];\n"));
        assert!(!rule.matches("view.backgroundColor = [UIColor pbx_brandColor];\n"));
    }

    #[test]
    fn test_framework_import() {
        let rule = framework_import().unwrap();
        assert!(rule.matches("#import <UIKit/UIKit.h>\n"));
        assert!(rule.matches("#import <CoreData/CoreData.h>\n"));
        assert!(!rule.matches("#import <Masonry/Masonry.h>\n"));
        assert!(!rule.matches("#import \"Foo.h\"\n"));
        assert_eq!(rule.describe(" #import <UIKit/UIKit.h>\n"), "\"#import <UIKit/UIKit.h>\", @import?");
    }

    #[test]
    fn test_space_before_semicolon() {
        let rule = space_before_semicolon().unwrap();
        assert!(rule.matches("    [self reload] ;\n"));
        assert!(!rule.matches("    [self reload];\n"));
    }

    #[test]
    fn test_line_length() {
        let rule = LineLengthRule::new(10);
        assert!(!rule.matches("123456789\n"));
        assert!(rule.matches("1234567890\n"));
        assert!(rule.applies_to("mm"));
        assert!(rule.applies_to("hpp"));
        assert!(!rule.applies_to("c"));
    }

    #[test]
    fn test_line_length_counts_chars() {
        let rule = LineLengthRule::new(3);
        assert!(!rule.matches("äöü"));
    }

    #[test]
    fn test_extra_space() {
        let rule = ExtraSpaceRule::new().unwrap();
        assert!(rule.matches("    id  value = nil;\n"));
        assert!(!rule.matches("    id value = nil;\n"));
        assert!(!rule.matches("    int x  = 1;\n"));
        assert!(!rule.matches("@property (nonatomic)  BOOL editing;\n"));
    }

    #[test]
    fn test_extra_space_counts_adjacent_gaps() {
        let rule = ExtraSpaceRule::new().unwrap();
        assert_eq!(rule.gap_count("    id  x  = nil;\n"), 2);
        assert!(rule.matches("    id  x  = nil;\n"));
        assert!(!rule.matches("    x  = nil;\n"));
    }

    #[test]
    fn test_copy_property() {
        let rule = CopyPropertyRule::new().unwrap();
        assert!(rule.matches("@property (nonatomic, strong) NSString *name;\n"));
        assert!(rule.matches("@property (nonatomic, strong) void (^handler)(void);\n"));
        assert!(!rule.matches("@property (nonatomic, copy) NSString *name;\n"));
        assert!(!rule.matches("@property (nonatomic, strong) NSArray *items;\n"));
    }
}
