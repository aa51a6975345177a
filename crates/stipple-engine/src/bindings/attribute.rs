use std::rc::Rc;

use crate::device::{AttribIndex, BufferId, Device, ProgramId};

/// A vertex input fed from one device buffer.
///
/// The buffer is allocated and bound when the binding attaches. Every value
/// change replaces its whole content. The main attribute also derives the
/// vertex count from its value.
#[derive(Debug, Clone)]
pub struct AttributeBinding {
    name: String,
    size: u32,
    main: bool,
    buffer: BufferId,
    index: Option<AttribIndex>,
    last: Option<Rc<[f32]>>,
    vertex_count: Option<u32>,
}

impl AttributeBinding {
    pub const DEFAULT_SIZE: u32 = 3;

    pub fn attach<D: Device + ?Sized>(
        device: &mut D,
        program: ProgramId,
        name: &str,
        size: u32,
        main: bool,
    ) -> Self {
        let buffer = device.create_buffer();
        let index = device.attrib_location(program, name);

        match index {
            Some(index) if (1..=4).contains(&size) => device.bind_attribute(buffer, index, size),
            Some(_) => log::debug!("attribute {name:?} has unsupported size {size}"),
            None => log::debug!("attribute {name:?} is not used by the program"),
        }

        Self {
            name: name.to_string(),
            size,
            main,
            buffer,
            index,
            last: None,
            vertex_count: None,
        }
    }

    /// Uploads `value` if it differs from the last upload. Returns whether
    /// it did.
    pub fn update<D: Device + ?Sized>(&mut self, device: &mut D, value: &Rc<[f32]>) -> bool {
        let unchanged = self
            .last
            .as_ref()
            .is_some_and(|last| Rc::ptr_eq(last, value) || last[..] == value[..]);
        if unchanged {
            return false;
        }

        if self.main {
            self.vertex_count = Some(vertex_count(value.len(), self.size));
        }
        device.buffer_data(self.buffer, value);
        self.last = Some(Rc::clone(value));
        true
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub fn is_resolved(&self) -> bool {
        self.index.is_some()
    }

    /// Vertices described by the last uploaded value.
    ///
    /// `None` until a main binding has uploaded once; always `None` for
    /// non-main bindings.
    pub fn vertex_count(&self) -> Option<u32> {
        self.vertex_count
    }
}

fn vertex_count(len: usize, size: u32) -> u32 {
    if !(1..=4).contains(&size) {
        return 0;
    }
    (len / size as usize).min(u32::MAX as usize) as u32
}
