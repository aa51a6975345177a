//! Shader interface discovery.
//!
//! A small WGSL scanner that finds what the binding layer resolves by name:
//! entry points, `var<uniform>` globals, texture and sampler slots and the
//! vertex entry point's `@location` inputs. It is not a validator; function
//! bodies are skipped by brace matching. Full validation is left to the
//! device backend.

use std::collections::HashMap;

use super::{ProgramError, ShaderStage, UniformKind};

// ── Public interface ──────────────────────────────────────────────────────

/// A named uniform global.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// `None` when the WGSL type is not one of the eight supported shapes.
    pub kind: Option<UniformKind>,
}

/// A vertex input of the vertex entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSlot {
    pub name: String,
    pub location: u32,
}

/// A texture or sampler global.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
}

/// Merged interface of a vertex + fragment pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub uniforms: Vec<UniformSlot>,
    pub attributes: Vec<AttributeSlot>,
    /// Sorted by `(group, binding)`.
    pub textures: Vec<ResourceSlot>,
    /// Sorted by `(group, binding)`.
    pub samplers: Vec<ResourceSlot>,
}

impl ShaderInterface {
    /// Scans both stages and links them.
    ///
    /// Scan failures and missing entry points are compile errors for the
    /// offending stage. Contradictory declarations across stages are link errors.
    pub fn reflect(vertex: &str, fragment: &str) -> Result<Self, ProgramError> {
        let vs = scan_stage(vertex, ShaderStage::Vertex)?;
        let fs = scan_stage(fragment, ShaderStage::Fragment)?;
        link(vs, fs)
    }

    pub fn uniform(&self, name: &str) -> Option<(usize, &UniformSlot)> {
        self.uniforms.iter().enumerate().find(|(_, u)| u.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSlot> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Highest bind group index used, if any resource is declared.
    pub fn max_group(&self) -> Option<u32> {
        let uniforms = self.uniforms.iter().map(|u| u.group);
        let textures = self.textures.iter().map(|t| t.group);
        let samplers = self.samplers.iter().map(|s| s.group);
        uniforms.chain(textures).chain(samplers).max()
    }
}

struct StageInterface {
    entry: String,
    uniforms: Vec<UniformSlot>,
    attributes: Vec<AttributeSlot>,
    textures: Vec<ResourceSlot>,
    samplers: Vec<ResourceSlot>,
}

fn scan_stage(src: &str, stage: ShaderStage) -> Result<StageInterface, ProgramError> {
    let tokens = Lexer::new(src)
        .tokenize()
        .map_err(|log| ProgramError::compile(stage, log))?;
    let module = Parser::new(tokens)
        .module()
        .map_err(|log| ProgramError::compile(stage, log))?;

    let marker = match stage {
        ShaderStage::Vertex => "vertex",
        ShaderStage::Fragment => "fragment",
    };
    let entry = module
        .functions
        .iter()
        .find(|f| f.attrs.iter().any(|a| a.name == marker))
        .ok_or_else(|| ProgramError::compile(stage, format!("no @{marker} entry point")))?;

    let mut attributes = Vec::new();
    if stage == ShaderStage::Vertex {
        for param in &entry.params {
            if let Some(location) = find_number(&param.attrs, "location") {
                attributes.push(AttributeSlot { name: param.name.clone(), location });
            } else if let Some(members) = module.structs.get(&param.ty) {
                for member in members {
                    if let Some(location) = find_number(&member.attrs, "location") {
                        attributes.push(AttributeSlot { name: member.name.clone(), location });
                    }
                }
            }
        }
    }

    let mut uniforms = Vec::new();
    let mut textures = Vec::new();
    let mut samplers = Vec::new();
    for global in &module.globals {
        let (Some(group), Some(binding)) = (
            find_number(&global.attrs, "group"),
            find_number(&global.attrs, "binding"),
        ) else {
            continue;
        };
        let name = global.name.clone();

        if global.address_space.as_deref() == Some("uniform") {
            uniforms.push(UniformSlot { name, group, binding, kind: uniform_kind(&global.ty) });
        } else if global.ty.starts_with("texture_") {
            textures.push(ResourceSlot { name, group, binding });
        } else if global.ty == "sampler" {
            samplers.push(ResourceSlot { name, group, binding });
        }
    }

    Ok(StageInterface {
        entry: entry.name.clone(),
        uniforms,
        attributes,
        textures,
        samplers,
    })
}

fn link(vs: StageInterface, fs: StageInterface) -> Result<ShaderInterface, ProgramError> {
    let mut uniforms: Vec<UniformSlot> = Vec::new();
    for u in vs.uniforms.into_iter().chain(fs.uniforms) {
        match uniforms.iter().find(|existing| existing.name == u.name) {
            Some(existing) if *existing == u => {}
            Some(existing) => {
                return Err(ProgramError::link(format!(
                    "uniform `{}` declared as @group({}) @binding({}) and @group({}) @binding({}) with differing types",
                    u.name, existing.group, existing.binding, u.group, u.binding
                )));
            }
            None => uniforms.push(u),
        }
    }

    let textures = merge_resources(vs.textures, fs.textures)?;
    let samplers = merge_resources(vs.samplers, fs.samplers)?;

    let mut taken: HashMap<(u32, u32), &str> = HashMap::new();
    let all_slots = uniforms
        .iter()
        .map(|u| (u.group, u.binding, u.name.as_str()))
        .chain(textures.iter().map(|t| (t.group, t.binding, t.name.as_str())))
        .chain(samplers.iter().map(|s| (s.group, s.binding, s.name.as_str())));
    for (group, binding, name) in all_slots {
        if let Some(other) = taken.insert((group, binding), name) {
            return Err(ProgramError::link(format!(
                "`{other}` and `{name}` both bound at @group({group}) @binding({binding})"
            )));
        }
    }

    Ok(ShaderInterface {
        vertex_entry: vs.entry,
        fragment_entry: fs.entry,
        uniforms,
        attributes: vs.attributes,
        textures,
        samplers,
    })
}

fn merge_resources(
    vs: Vec<ResourceSlot>,
    fs: Vec<ResourceSlot>,
) -> Result<Vec<ResourceSlot>, ProgramError> {
    let mut merged: Vec<ResourceSlot> = Vec::new();
    for slot in vs.into_iter().chain(fs) {
        match merged.iter().find(|m| m.group == slot.group && m.binding == slot.binding) {
            Some(existing) if existing.name == slot.name => {}
            Some(existing) => {
                return Err(ProgramError::link(format!(
                    "`{}` and `{}` both bound at @group({}) @binding({})",
                    existing.name, slot.name, slot.group, slot.binding
                )));
            }
            None => merged.push(slot),
        }
    }
    merged.sort_by_key(|s| (s.group, s.binding));
    Ok(merged)
}

fn uniform_kind(ty: &str) -> Option<UniformKind> {
    Some(match ty {
        "i32" => UniformKind::Int,
        "f32" => UniformKind::Float,
        "vec2<f32>" | "vec2f" => UniformKind::Vec2,
        "vec3<f32>" | "vec3f" => UniformKind::Vec3,
        "vec4<f32>" | "vec4f" => UniformKind::Vec4,
        "mat2x2<f32>" | "mat2x2f" => UniformKind::Mat2,
        "mat3x3<f32>" | "mat3x3f" => UniformKind::Mat3,
        "mat4x4<f32>" | "mat4x4f" => UniformKind::Mat4,
        _ => return None,
    })
}

fn find_number(attrs: &[Attribute], name: &str) -> Option<u32> {
    attrs.iter().find(|a| a.name == name).and_then(Attribute::number)
}

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    At,
    LParen,
    RParen,
    LAngle,
    RAngle,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,
    Arrow,
    Punct(char),
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok == Token::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), String> {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            let rest = &self.src[self.pos..];
            if rest.starts_with("//") {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.advance();
                }
            } else if rest.starts_with("/*") {
                self.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    // WGSL block comments nest.
    fn skip_block_comment(&mut self) -> Result<(), String> {
        let mut depth = 0usize;
        loop {
            let rest = &self.src[self.pos..];
            if rest.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if rest.starts_with("*/") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    return Ok(());
                }
            } else if self.advance().is_none() {
                return Err("unterminated block comment".to_string());
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, String> {
        self.skip_whitespace_and_comments()?;

        let ch = match self.peek() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        let single = match ch {
            '@' => Some(Token::At),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '<' => Some(Token::LAngle),
            '>' => Some(Token::RAngle),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ':' => Some(Token::Colon),
            ';' => Some(Token::Semi),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(tok) = single {
            self.advance();
            return Ok(tok);
        }

        match ch {
            '-' => {
                self.advance();
                if self.peek() == Some('>') {
                    self.advance();
                    Ok(Token::Arrow)
                } else {
                    Ok(Token::Punct('-'))
                }
            }
            c if c.is_ascii_digit() => Ok(self.lex_number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.lex_ident()),
            c if c.is_ascii_punctuation() => {
                self.advance();
                Ok(Token::Punct(c))
            }
            other => Err(format!("unexpected character {:?}", other)),
        }
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '.') {
            self.advance();
        }
        Token::Number(self.src[start..self.pos].to_string())
    }

    fn lex_ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        Token::Ident(self.src[start..self.pos].to_string())
    }
}

// ── Parser ────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Attribute {
    name: String,
    args: Vec<Token>,
}

impl Attribute {
    fn number(&self) -> Option<u32> {
        self.args.iter().find_map(|t| match t {
            Token::Number(n) => n.trim_end_matches(['u', 'i']).parse().ok(),
            _ => None,
        })
    }
}

#[derive(Debug)]
struct Typed {
    name: String,
    ty: String,
    attrs: Vec<Attribute>,
}

#[derive(Debug)]
struct Global {
    name: String,
    ty: String,
    address_space: Option<String>,
    attrs: Vec<Attribute>,
}

#[derive(Debug)]
struct Function {
    name: String,
    attrs: Vec<Attribute>,
    params: Vec<Typed>,
}

#[derive(Debug, Default)]
struct Module {
    globals: Vec<Global>,
    functions: Vec<Function>,
    structs: HashMap<String, Vec<Typed>>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == tok {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token) -> Result<(), String> {
        let found = self.bump();
        if found == tok {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {:?}", tok, found))
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        match self.bump() {
            Token::Ident(s) => Ok(s),
            other => Err(format!("expected identifier, found {:?}", other)),
        }
    }

    fn module(mut self) -> Result<Module, String> {
        let mut module = Module::default();
        loop {
            let attrs = self.attributes()?;
            match self.peek().clone() {
                Token::Eof if attrs.is_empty() => return Ok(module),
                Token::Eof => return Err("dangling attribute at end of module".to_string()),
                Token::Semi => {
                    self.bump();
                }
                Token::Ident(kw) => match kw.as_str() {
                    "var" => module.globals.push(self.global(attrs)?),
                    "fn" => module.functions.push(self.function(attrs)?),
                    "struct" => {
                        let (name, members) = self.structure()?;
                        module.structs.insert(name, members);
                    }
                    "const" | "override" | "alias" | "enable" | "requires" | "diagnostic"
                    | "const_assert" => self.skip_statement()?,
                    other => return Err(format!("unexpected `{other}` at module scope")),
                },
                other => return Err(format!("unexpected {:?} at module scope", other)),
            }
        }
    }

    fn attributes(&mut self) -> Result<Vec<Attribute>, String> {
        let mut attrs = Vec::new();
        while self.eat(&Token::At) {
            let name = self.ident()?;
            let mut args = Vec::new();
            if self.eat(&Token::LParen) {
                let mut depth = 1usize;
                loop {
                    match self.bump() {
                        Token::LParen => depth += 1,
                        Token::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        Token::Eof => return Err(format!("unterminated @{name}(...)")),
                        tok => args.push(tok),
                    }
                }
            }
            attrs.push(Attribute { name, args });
        }
        Ok(attrs)
    }

    /// Type expression flattened to text, e.g. `vec3<f32>`.
    fn type_expr(&mut self) -> Result<String, String> {
        let mut ty = self.ident()?;
        if self.peek() != &Token::LAngle {
            return Ok(ty);
        }

        let mut depth = 0usize;
        loop {
            let tok = self.bump();
            match &tok {
                Token::LAngle => depth += 1,
                Token::RAngle => depth -= 1,
                Token::Eof => return Err(format!("unterminated template list in `{ty}`")),
                _ => {}
            }
            ty.push_str(&token_text(&tok));
            if depth == 0 {
                return Ok(ty);
            }
        }
    }

    fn global(&mut self, attrs: Vec<Attribute>) -> Result<Global, String> {
        self.bump(); // `var`

        let mut address_space = None;
        if self.eat(&Token::LAngle) {
            address_space = Some(self.ident()?);
            while !self.eat(&Token::RAngle) {
                if self.bump() == Token::Eof {
                    return Err("unterminated address space".to_string());
                }
            }
        }

        let name = self.ident()?;
        let ty = if self.eat(&Token::Colon) {
            self.type_expr()?
        } else {
            String::new()
        };
        self.skip_statement()?;

        Ok(Global { name, ty, address_space, attrs })
    }

    fn function(&mut self, attrs: Vec<Attribute>) -> Result<Function, String> {
        self.bump(); // `fn`
        let name = self.ident()?;

        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        while !self.eat(&Token::RParen) {
            let attrs = self.attributes()?;
            let pname = self.ident()?;
            self.expect(Token::Colon)?;
            let ty = self.type_expr()?;
            params.push(Typed { name: pname, ty, attrs });
            if !self.eat(&Token::Comma) && self.peek() != &Token::RParen {
                return Err(format!("expected `,` or `)` in parameters of `{name}`"));
            }
        }

        if self.eat(&Token::Arrow) {
            self.attributes()?;
            self.type_expr()?;
        }

        self.skip_block()?;
        Ok(Function { name, attrs, params })
    }

    fn structure(&mut self) -> Result<(String, Vec<Typed>), String> {
        self.bump(); // `struct`
        let name = self.ident()?;
        self.expect(Token::LBrace)?;

        let mut members = Vec::new();
        while !self.eat(&Token::RBrace) {
            let attrs = self.attributes()?;
            let mname = self.ident()?;
            self.expect(Token::Colon)?;
            let ty = self.type_expr()?;
            members.push(Typed { name: mname, ty, attrs });
            if !self.eat(&Token::Comma) && !self.eat(&Token::Semi) && self.peek() != &Token::RBrace {
                return Err(format!("expected `,` or `}}` in struct `{name}`"));
            }
        }
        self.eat(&Token::Semi);

        Ok((name, members))
    }

    fn skip_block(&mut self) -> Result<(), String> {
        self.expect(Token::LBrace)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Token::LBrace => depth += 1,
                Token::RBrace => depth -= 1,
                Token::Eof => return Err("unterminated function body".to_string()),
                _ => {}
            }
        }
        Ok(())
    }

    fn skip_statement(&mut self) -> Result<(), String> {
        let mut depth = 0usize;
        loop {
            match self.bump() {
                Token::LParen | Token::LBrace | Token::LBracket => depth += 1,
                Token::RParen | Token::RBrace | Token::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                Token::Semi if depth == 0 => return Ok(()),
                Token::Eof => return Err("expected `;`".to_string()),
                _ => {}
            }
        }
    }
}

fn token_text(tok: &Token) -> String {
    match tok {
        Token::Ident(s) | Token::Number(s) => s.clone(),
        Token::LAngle => "<".into(),
        Token::RAngle => ">".into(),
        Token::Comma => ",".into(),
        Token::LParen => "(".into(),
        Token::RParen => ")".into(),
        Token::Punct(c) => c.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
        // Point sprite vertex stage.
        @group(0) @binding(0) var<uniform> u_projection: mat4x4<f32>;
        @group(0) @binding(1) var<uniform> u_time: f32;

        struct VertexOut {
            @builtin(position) position: vec4<f32>,
            @location(0) color: vec3<f32>,
        };

        @vertex
        fn vs_main(@location(0) a_position: vec3<f32>, @location(1) a_color: vec3<f32>) -> VertexOut {
            var out: VertexOut;
            out.position = u_projection * vec4<f32>(a_position, 1.0);
            out.color = a_color * (0.5 + 0.5 * sin(u_time));
            return out;
        }
    "#;

    const FRAGMENT: &str = r#"
        @group(0) @binding(1) var<uniform> u_time: f32;
        @group(1) @binding(1) var u_sampler: sampler;
        @group(1) @binding(0) var u_texture: texture_2d<f32>;

        /* block /* nested */ comment */
        @fragment
        fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
            let tex = textureSample(u_texture, u_sampler, vec2<f32>(0.5, 0.5));
            return vec4<f32>(color, 1.0) * tex;
        }
    "#;

    #[test]
    fn reflects_entry_points_uniforms_and_attributes() {
        let iface = ShaderInterface::reflect(VERTEX, FRAGMENT).unwrap();

        assert_eq!(iface.vertex_entry, "vs_main");
        assert_eq!(iface.fragment_entry, "fs_main");

        let (_, proj) = iface.uniform("u_projection").unwrap();
        assert_eq!((proj.group, proj.binding, proj.kind), (0, 0, Some(UniformKind::Mat4)));
        let (_, time) = iface.uniform("u_time").unwrap();
        assert_eq!(time.kind, Some(UniformKind::Float));
        assert_eq!(iface.uniforms.len(), 2, "shared uniform is merged");

        assert_eq!(iface.attribute("a_position").unwrap().location, 0);
        assert_eq!(iface.attribute("a_color").unwrap().location, 1);
        assert!(iface.attribute("color").is_none());
    }

    #[test]
    fn textures_and_samplers_are_ordered_by_slot() {
        let iface = ShaderInterface::reflect(VERTEX, FRAGMENT).unwrap();
        assert_eq!(iface.textures.len(), 1);
        assert_eq!(iface.textures[0].name, "u_texture");
        assert_eq!(iface.samplers[0].name, "u_sampler");
        assert_eq!(iface.max_group(), Some(1));
    }

    #[test]
    fn struct_vertex_inputs_are_expanded() {
        let src = r#"
            @vertex fn vs(input: VertexIn) -> @builtin(position) vec4f {
                return vec4f(input.pos, 1.0);
            }
            struct VertexIn {
                @location(3) pos: vec3f,
                @builtin(vertex_index) idx: u32,
            }
            @fragment fn fs() -> @location(0) vec4f { return vec4f(1.0); }
        "#;
        let iface = ShaderInterface::reflect(src, src).unwrap();
        assert_eq!(iface.attributes, vec![AttributeSlot { name: "pos".into(), location: 3 }]);
    }

    #[test]
    fn every_supported_uniform_shape_is_recognised() {
        let src = r#"
            @group(0) @binding(0) var<uniform> a: i32;
            @group(0) @binding(1) var<uniform> b: vec2f;
            @group(0) @binding(2) var<uniform> c: vec3<f32>;
            @group(0) @binding(3) var<uniform> d: vec4<f32>;
            @group(0) @binding(4) var<uniform> e: mat2x2<f32>;
            @group(0) @binding(5) var<uniform> f: mat3x3f;
            @group(0) @binding(6) var<uniform> g: array<vec4<f32>, 4>;
            @vertex fn vs() -> @builtin(position) vec4f { return vec4f(0.0); }
            @fragment fn fs() -> @location(0) vec4f { return vec4f(0.0); }
        "#;
        let iface = ShaderInterface::reflect(src, src).unwrap();
        let kinds: Vec<_> = iface.uniforms.iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Some(UniformKind::Int),
                Some(UniformKind::Vec2),
                Some(UniformKind::Vec3),
                Some(UniformKind::Vec4),
                Some(UniformKind::Mat2),
                Some(UniformKind::Mat3),
                None,
            ]
        );
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn missing_fragment_entry_is_a_fragment_compile_error() {
        let err = ShaderInterface::reflect(VERTEX, "fn helper() {}").unwrap_err();
        assert!(matches!(err, ProgramError::Compile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn unterminated_comment_is_a_compile_error() {
        let err = ShaderInterface::reflect("/* never closed", FRAGMENT).unwrap_err();
        assert!(matches!(err, ProgramError::Compile { stage: ShaderStage::Vertex, .. }));
    }

    #[test]
    fn unbalanced_body_is_a_compile_error() {
        let src = "@vertex fn vs() -> @builtin(position) vec4f { return vec4f(0.0);";
        assert!(ShaderInterface::reflect(src, FRAGMENT).is_err());
    }

    #[test]
    fn conflicting_uniform_declarations_fail_to_link() {
        let fragment = FRAGMENT.replace("@group(0) @binding(1) var<uniform> u_time: f32;",
            "@group(0) @binding(1) var<uniform> u_time: vec2<f32>;");
        let err = ShaderInterface::reflect(VERTEX, &fragment).unwrap_err();
        assert!(matches!(err, ProgramError::Link { .. }));
    }

    #[test]
    fn two_names_on_one_slot_fail_to_link() {
        let fragment = FRAGMENT.replace("var<uniform> u_time", "var<uniform> u_other");
        let err = ShaderInterface::reflect(VERTEX, &fragment).unwrap_err();
        assert!(matches!(err, ProgramError::Link { .. }));
    }
}
