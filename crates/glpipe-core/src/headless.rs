//! A [`Device`] that needs no GPU.
//!
//! Every call is recorded in order, object lifetimes are tracked, and compile
//! and link status are simulated:
//!
//! - Compilation runs a coarse GLSL lint: the source must declare `main`,
//!   braces and parentheses must balance, and every statement line inside a
//!   block must end in `;`, `{`, `}`, `,` or `(`. Failures produce a driver-style
//!   log (`ERROR: 0:<line>: ...`).
//! - Linking succeeds when exactly one successfully compiled vertex unit and one
//!   fragment unit are attached, unless a failure was forced with
//!   [`HeadlessDevice::with_link_failure`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::device::{bound_log, BufferTarget, BufferUsage, Device, ObjectId, Primitive};
use crate::types::{ClearColor, ShaderKind, VertexLayout, Viewport};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderKind, ObjectId),
    ShaderSource(ObjectId),
    CompileShader(ObjectId),
    DeleteShader(ObjectId),
    CreateProgram(ObjectId),
    AttachShader(ObjectId, ObjectId),
    DetachShader(ObjectId, ObjectId),
    LinkProgram(ObjectId),
    UseProgram(ObjectId),
    DeleteProgram(ObjectId),
    CreateVertexArray(ObjectId),
    BindVertexArray(ObjectId),
    DeleteVertexArray(ObjectId),
    CreateBuffer(ObjectId),
    BindBuffer(BufferTarget, ObjectId),
    BufferData {
        target: BufferTarget,
        len: usize,
        usage: BufferUsage,
    },
    DeleteBuffer(ObjectId),
    VertexAttribPointer(VertexLayout),
    EnableVertexAttribArray(u32),
    Viewport(Viewport),
    ClearColor(ClearColor),
    Clear,
    DrawArrays(DrawCall),
}

/// A draw call together with the state it was issued against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
    pub program: Option<ObjectId>,
    pub vertex_array: Option<ObjectId>,
    pub clear_color: Option<ClearColor>,
    pub viewport: Option<Viewport>,
}

#[derive(Debug)]
struct ShaderObject {
    kind: ShaderKind,
    source: String,
    status: Option<Result<(), String>>,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: BTreeSet<ObjectId>,
    status: Option<Result<(), String>>,
}

/// Attribute state captured by a vertex array object.
#[derive(Debug, Clone, Default)]
pub struct VertexArrayState {
    pub attributes: Vec<(VertexLayout, Option<ObjectId>)>,
    pub enabled: BTreeSet<u32>,
}

#[derive(Debug, Default)]
struct State {
    next_id: ObjectId,
    calls: Vec<Call>,
    shaders: BTreeMap<ObjectId, ShaderObject>,
    programs: BTreeMap<ObjectId, ProgramObject>,
    buffers: BTreeMap<ObjectId, Vec<u8>>,
    vertex_arrays: BTreeMap<ObjectId, VertexArrayState>,
    bound_buffer: Option<ObjectId>,
    bound_vertex_array: Option<ObjectId>,
    current_program: Option<ObjectId>,
    clear_color: Option<ClearColor>,
    viewport: Option<Viewport>,
    forced_link_failure: Option<String>,
}

impl State {
    fn alloc(&mut self) -> ObjectId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
    state: RefCell<State>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent link fail with `log`.
    pub fn with_link_failure(self, log: impl Into<String>) -> Self {
        self.state.borrow_mut().forced_link_failure = Some(log.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::DrawArrays(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// Contents of a live buffer.
    pub fn buffer_contents(&self, buffer: ObjectId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Attribute configuration recorded by a live vertex array.
    pub fn vertex_array_state(&self, vertex_array: ObjectId) -> Option<VertexArrayState> {
        self.state.borrow().vertex_arrays.get(&vertex_array).cloned()
    }

    pub fn current_viewport(&self) -> Option<Viewport> {
        self.state.borrow().viewport
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Device for HeadlessDevice {
    fn create_shader(&self, kind: ShaderKind) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.shaders.insert(
            id,
            ShaderObject {
                kind,
                source: String::new(),
                status: None,
            },
        );
        state.calls.push(Call::CreateShader(kind, id));
        id
    }

    fn shader_source(&self, shader: ObjectId, source: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.source = source.to_owned();
        }
        state.calls.push(Call::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.status = Some(lint_glsl(&object.source));
        }
        state.calls.push(Call::CompileShader(shader));
    }

    fn compile_status(&self, shader: ObjectId) -> bool {
        matches!(
            self.state.borrow().shaders.get(&shader).and_then(|s| s.status.as_ref()),
            Some(Ok(()))
        )
    }

    fn shader_info_log(&self, shader: ObjectId, capacity: usize) -> String {
        let log = match self.state.borrow().shaders.get(&shader).and_then(|s| s.status.clone()) {
            Some(Err(log)) => log,
            _ => String::new(),
        };
        bound_log(log, capacity)
    }

    fn delete_shader(&self, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.programs.insert(id, ProgramObject::default());
        state.calls.push(Call::CreateProgram(id));
        id
    }

    fn attach_shader(&self, program: ObjectId, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.insert(shader);
        }
        state.calls.push(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: ObjectId, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.remove(&shader);
        }
        state.calls.push(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: ObjectId) {
        let mut state = self.state.borrow_mut();
        let status = match &state.forced_link_failure {
            Some(log) => Err(log.clone()),
            None => {
                let attached = state
                    .programs
                    .get(&program)
                    .map(|p| p.attached.clone())
                    .unwrap_or_default();
                check_stages(&state.shaders, &attached)
            }
        };
        if let Some(object) = state.programs.get_mut(&program) {
            object.status = Some(status);
        }
        state.calls.push(Call::LinkProgram(program));
    }

    fn link_status(&self, program: ObjectId) -> bool {
        matches!(
            self.state.borrow().programs.get(&program).and_then(|p| p.status.as_ref()),
            Some(Ok(()))
        )
    }

    fn program_info_log(&self, program: ObjectId, capacity: usize) -> String {
        let log = match self.state.borrow().programs.get(&program).and_then(|p| p.status.clone()) {
            Some(Err(log)) => log,
            _ => String::new(),
        };
        bound_log(log, capacity)
    }

    fn use_program(&self, program: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.current_program = Some(program);
        state.calls.push(Call::UseProgram(program));
    }

    fn delete_program(&self, program: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
        state.calls.push(Call::DeleteProgram(program));
    }

    fn create_vertex_array(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.vertex_arrays.insert(id, VertexArrayState::default());
        state.calls.push(Call::CreateVertexArray(id));
        id
    }

    fn bind_vertex_array(&self, vertex_array: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.bound_vertex_array = Some(vertex_array);
        state.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
        state.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.buffers.insert(id, Vec::new());
        state.calls.push(Call::CreateBuffer(id));
        id
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.bound_buffer = Some(buffer);
        state.calls.push(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        if let Some(buffer) = state.bound_buffer {
            if let Some(storage) = state.buffers.get_mut(&buffer) {
                *storage = data.to_vec();
            }
        }
        state.calls.push(Call::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn delete_buffer(&self, buffer: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.bound_buffer == Some(buffer) {
            state.bound_buffer = None;
        }
        state.calls.push(Call::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer(&self, layout: &VertexLayout) {
        let mut state = self.state.borrow_mut();
        let buffer = state.bound_buffer;
        if let Some(vertex_array) = state.bound_vertex_array {
            if let Some(vao) = state.vertex_arrays.get_mut(&vertex_array) {
                vao.attributes.push((*layout, buffer));
            }
        }
        state.calls.push(Call::VertexAttribPointer(*layout));
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(vertex_array) = state.bound_vertex_array {
            if let Some(vao) = state.vertex_arrays.get_mut(&vertex_array) {
                vao.enabled.insert(location);
            }
        }
        state.calls.push(Call::EnableVertexAttribArray(location));
    }

    fn viewport(&self, viewport: Viewport) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some(viewport);
        state.calls.push(Call::Viewport(viewport));
    }

    fn clear_color(&self, color: ClearColor) {
        let mut state = self.state.borrow_mut();
        state.clear_color = Some(color);
        state.calls.push(Call::ClearColor(color));
    }

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32) {
        let mut state = self.state.borrow_mut();
        let draw = DrawCall {
            primitive,
            first,
            count,
            program: state.current_program,
            vertex_array: state.bound_vertex_array,
            clear_color: state.clear_color,
            viewport: state.viewport,
        };
        state.calls.push(Call::DrawArrays(draw));
    }
}

fn check_stages(
    shaders: &BTreeMap<ObjectId, ShaderObject>,
    attached: &BTreeSet<ObjectId>,
) -> Result<(), String> {
    let compiled = |kind| {
        attached
            .iter()
            .filter_map(|id| shaders.get(id))
            .filter(|s| s.kind == kind && matches!(s.status, Some(Ok(()))))
            .count()
    };

    match (compiled(ShaderKind::Vertex), compiled(ShaderKind::Fragment)) {
        (1, 1) => Ok(()),
        (0, _) => Err("error: no compiled vertex shader attached to program".into()),
        (_, 0) => Err("error: no compiled fragment shader attached to program".into()),
        _ => Err("error: more than one shader attached for a single stage".into()),
    }
}

/// Coarse syntax check standing in for a real GLSL front end.
fn lint_glsl(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("ERROR: 0:1: '' : syntax error: empty shader source".into());
    }

    let mut depth = 0i32;
    let mut parens = 0i32;
    let mut last_line = 1;

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        last_line = number;
        let line = raw.split("//").next().unwrap_or_default().trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
            if depth < 0 || parens < 0 {
                return Err(format!("ERROR: 0:{number}: '{c}' : syntax error: unexpected token"));
            }
        }

        let terminated = [';', '{', '}', ',', '(']
            .iter()
            .any(|end| line.ends_with(*end));
        if depth > 0 && parens == 0 && !terminated {
            return Err(format!(
                "ERROR: 0:{number}: '{line}' : syntax error: expected ';' at end of statement"
            ));
        }
    }

    if depth != 0 || parens != 0 {
        return Err(format!(
            "ERROR: 0:{last_line}: '' : syntax error: unexpected end of file"
        ));
    }

    if !source.contains("main") {
        return Err("ERROR: 0:1: 'main' : function not defined".into());
    }

    Ok(())
}
