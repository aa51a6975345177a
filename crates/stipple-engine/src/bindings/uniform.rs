use crate::device::{Device, ProgramId, UniformKind, UniformLocation, UniformValue};

/// A named uniform with a fixed value shape.
///
/// The declared [`UniformKind`] selects how values are written. Values of a
/// different shape are reshaped when their component count allows it and
/// dropped otherwise.
#[derive(Debug, Clone)]
pub struct UniformBinding {
    name: String,
    kind: UniformKind,
    location: Option<UniformLocation>,
    last: Option<UniformValue>,
}

impl UniformBinding {
    /// Resolves `name` against `program`. Called once per binding lifetime.
    pub fn attach<D: Device + ?Sized>(
        device: &mut D,
        program: ProgramId,
        name: &str,
        kind: UniformKind,
    ) -> Self {
        let location = device.uniform_location(program, name);
        if location.is_none() {
            log::debug!("uniform {name:?} is not used by the program");
        }
        Self {
            name: name.to_string(),
            kind,
            location,
            last: None,
        }
    }

    /// Writes `value` if it differs from the last one. Returns whether a
    /// write was issued.
    pub fn update<D: Device + ?Sized>(&mut self, device: &mut D, value: &UniformValue) -> bool {
        if self.last.as_ref() == Some(value) {
            return false;
        }
        self.last = Some(value.clone());

        let Some(location) = self.location else {
            return false;
        };
        match value.coerce(self.kind) {
            Some(shaped) => {
                device.write_uniform(location, &shaped);
                true
            }
            None => {
                log::debug!(
                    "uniform {:?} declared {} but given {}",
                    self.name,
                    self.kind,
                    value.kind()
                );
                false
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UniformKind {
        self.kind
    }

    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::fixtures::linked_device;
    use crate::device::Command;

    fn writes(device: &crate::device::HeadlessDevice) -> usize {
        device.count(|c| matches!(c, Command::WriteUniform { .. }))
    }

    #[test]
    fn resolves_location_once() {
        let (mut device, program) = linked_device();
        let mut binding = UniformBinding::attach(&mut device, program, "u_time", UniformKind::Float);

        binding.update(&mut device, &UniformValue::Float(1.0));
        binding.update(&mut device, &UniformValue::Float(2.0));

        let lookups = device.count(|c| matches!(c, Command::ResolveUniform { .. }));
        assert_eq!(lookups, 1);
        assert_eq!(device.uniform(program, "u_time"), Some(&UniformValue::Float(2.0)));
    }

    #[test]
    fn unchanged_value_is_not_rewritten() {
        let (mut device, program) = linked_device();
        let mut binding = UniformBinding::attach(&mut device, program, "u_tint", UniformKind::Vec3);

        assert!(binding.update(&mut device, &UniformValue::Vec3([1.0, 0.5, 0.0])));
        assert!(!binding.update(&mut device, &UniformValue::Vec3([1.0, 0.5, 0.0])));
        assert_eq!(writes(&device), 1);
    }

    #[test]
    fn int_tag_writes_integers() {
        let (mut device, program) = linked_device();
        let mut binding = UniformBinding::attach(&mut device, program, "u_frame", UniformKind::Int);

        binding.update(&mut device, &UniformValue::Float(7.0));
        assert_eq!(device.uniform(program, "u_frame"), Some(&UniformValue::Int(7)));
    }

    #[test]
    fn unknown_name_degrades_silently() {
        let (mut device, program) = linked_device();
        let mut binding = UniformBinding::attach(&mut device, program, "u_nope", UniformKind::Float);

        assert!(!binding.is_resolved());
        assert!(!binding.update(&mut device, &UniformValue::Float(1.0)));
        assert_eq!(writes(&device), 0);
    }

    #[test]
    fn mismatched_shape_is_dropped() {
        let (mut device, program) = linked_device();
        let mut binding = UniformBinding::attach(&mut device, program, "u_tint", UniformKind::Vec3);

        assert!(!binding.update(&mut device, &UniformValue::Vec2([1.0, 1.0])));
        assert_eq!(device.uniform(program, "u_tint"), None);
    }
}
