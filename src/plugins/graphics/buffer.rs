use wgpu::{Buffer, Device, BufferDescriptor};

/**
 * Ensures that buffer has at least enough space to fit the number of bytes specified.
 * Does NOT copy contents of old buffer in the case of a resize.
 */
pub fn reserve_buffer(buffer: &mut Buffer, size: u64, device: &Device) {
    if size > buffer.size() {
        let size = size.next_power_of_two();
        log::debug!("Growing buffer {:?} to {size} bytes", buffer.usage());
        *buffer = device.create_buffer(&BufferDescriptor {
            label: None,
            size,
            usage: buffer.usage(),
            mapped_at_creation: false,
        });
    }
}
