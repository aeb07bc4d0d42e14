/*!
Typed `wgpu` buffers.

A `wgpu::Buffer` is untyped bytes. Nothing stops a buffer of sample points from
being read back as iteration counts. [`Buffer<A>`] remembers its element type
and does all the [`bytemuck`] casting in one place.
*/

use std::{marker::PhantomData, mem::size_of, ops::Deref};

use wgpu::util::DeviceExt;

use crate::error::{Error, Result};

pub struct Buffer<A> {
    buffer: wgpu::Buffer,
    len: u64,
    phantom_data: PhantomData<A>,
}

impl<A: bytemuck::Pod + bytemuck::Zeroable> Buffer<A> {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of `A`s the buffer holds.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn size_in_bytes(&self) -> u64 {
        self.len * size_of::<A>() as u64
    }

    pub fn slice(&self) -> Slice<A> {
        Slice {
            slice: self.buffer.slice(..),
            phantom_data: PhantomData,
        }
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    /**
    Map the whole buffer for reading, block until the device has finished all
    submitted work, and copy the contents out.

    The buffer must have been created with `wgpu::BufferUsages::MAP_READ`.
    */
    pub fn read(&self, device: &wgpu::Device) -> Result<Vec<A>> {
        let slice = self.slice();

        let (sender, receiver) = futures_channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        device.poll(wgpu::Maintain::Wait);

        pollster::block_on(receiver)
            .map_err(|_| Error::DeviceExecution("buffer mapping was cancelled".into()))??;

        let contents = slice.get_mapped_range().to_vec();
        self.buffer.unmap();

        Ok(contents)
    }

    pub fn destroy(self) {
        self.buffer.destroy()
    }
}

pub struct Slice<'a, A> {
    slice: wgpu::BufferSlice<'a>,
    phantom_data: PhantomData<A>,
}

impl<'a, A> Slice<'a, A> {
    pub fn map_async(
        &self,
        mode: wgpu::MapMode,
        callback: impl FnOnce(std::result::Result<(), wgpu::BufferAsyncError>) + Send + 'static,
    ) {
        self.slice.map_async(mode, callback)
    }

    pub fn get_mapped_range(&self) -> View<'a, A> {
        View {
            view: self.slice.get_mapped_range(),
            phantom_data: PhantomData,
        }
    }
}

pub struct View<'a, A> {
    view: wgpu::BufferView<'a>,
    phantom_data: PhantomData<A>,
}

impl<'a, A: bytemuck::Pod + bytemuck::Zeroable> Deref for View<'a, A> {
    type Target = [A];

    fn deref(&self) -> &Self::Target {
        bytemuck::cast_slice(&*self.view)
    }
}

enum Contents<'a> {
    Contents(&'a [u8]),
    Size(u64),
}

pub struct Builder<'a, A> {
    label: Option<&'a str>,
    contents: Contents<'a>,
    usage: wgpu::BufferUsages,
    phantom_data: PhantomData<A>,
}

impl<'a, A: bytemuck::Pod + bytemuck::Zeroable> From<&'a [A]> for Builder<'a, A> {
    fn from(value: &'a [A]) -> Self {
        Self {
            label: None,
            contents: Contents::Contents(bytemuck::cast_slice(value)),
            usage: wgpu::BufferUsages::COPY_DST,
            phantom_data: PhantomData,
        }
    }
}

impl<'a, A: bytemuck::Pod + bytemuck::Zeroable> Builder<'a, A> {
    /// An uninitialised buffer of `len` elements.
    pub fn new(len: u64) -> Self {
        Self {
            label: None,
            contents: Contents::Size(len),
            usage: wgpu::BufferUsages::COPY_DST,
            phantom_data: PhantomData,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_usage(mut self, usage: wgpu::BufferUsages) -> Self {
        self.usage |= usage;
        self
    }

    pub fn create(self, device: &wgpu::Device) -> Buffer<A> {
        let (buffer, len) = match self.contents {
            Contents::Contents(contents) => (
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: self.label,
                    contents,
                    usage: self.usage,
                }),
                (contents.len() / size_of::<A>()) as u64,
            ),
            Contents::Size(len) => (
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: self.label,
                    size: len * size_of::<A>() as u64,
                    usage: self.usage,
                    mapped_at_creation: false,
                }),
                len,
            ),
        };

        Buffer {
            buffer,
            len,
            phantom_data: PhantomData,
        }
    }
}

pub fn copy_buffer_to_buffer<A: bytemuck::Pod + bytemuck::Zeroable>(
    command_encoder: &mut wgpu::CommandEncoder,
    source: &Buffer<A>,
    destination: &Buffer<A>,
) {
    debug_assert!(source.len() <= destination.len());
    command_encoder.copy_buffer_to_buffer(
        source.buffer(),
        0,
        destination.buffer(),
        0,
        source.size_in_bytes(),
    )
}
