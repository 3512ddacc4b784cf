use std::fmt;

pub const POSITION: &str = "POSITION";
pub const NORMAL: &str = "NORMAL";
pub const TANGENT: &str = "TANGENT";
pub const TEXCOORD_0: &str = "TEXCOORD_0";


#[derive(Debug, Clone, thiserror::Error)]
pub enum Err {
	#[error("Attribute {name}: {len} bytes is not a multiple of the row stride {stride}")]
	MisalignedData { name: String, len: usize, stride: usize },
	#[error("Attribute {0}: cannot append rows of a different layout")]
	LayoutMismatch(String),
	#[error("Unsupported glTF component type: {0}")]
	UnsupportedComponentType(u32),
}

/// A named, co-indexed vertex attribute. Rows are stored tightly packed as
/// little-endian bytes, so attributes the merge engine does not interpret
/// (colors, joints, custom semantics) travel through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
	/// glTF semantic, e.g. `POSITION` or `TEXCOORD_1`
	name: String,

	component_type: ComponentDataType,

	num_components: usize,

	/// integer components are interpreted as normalized fixed point
	normalized: bool,

	data: Vec<u8>,
}

impl Attribute {
	pub fn new(name: impl Into<String>, layout: AttributeLayout, data: Vec<u8>) -> Result<Self, Err> {
		let name = name.into();
		let stride = layout.stride();
		if stride == 0 || data.len() % stride != 0 {
			return Err(Err::MisalignedData { name, len: data.len(), stride });
		}
		Ok(Self {
			name,
			component_type: layout.component_type,
			num_components: layout.num_components,
			normalized: layout.normalized,
			data,
		})
	}

	/// Builds a float attribute from rows of `N` components.
	pub fn from_f32_rows<const N: usize>(name: impl Into<String>, rows: &[[f32; N]]) -> Self {
		let mut data = Vec::with_capacity(rows.len() * N * 4);
		for row in rows {
			for c in row {
				data.extend_from_slice(&c.to_le_bytes());
			}
		}
		Self {
			name: name.into(),
			component_type: ComponentDataType::F32,
			num_components: N,
			normalized: false,
			data,
		}
	}

	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn component_type(&self) -> ComponentDataType {
		self.component_type
	}

	#[inline]
	pub fn num_components(&self) -> usize {
		self.num_components
	}

	#[inline]
	pub fn normalized(&self) -> bool {
		self.normalized
	}

	pub fn layout(&self) -> AttributeLayout {
		AttributeLayout {
			component_type: self.component_type,
			num_components: self.num_components,
			normalized: self.normalized,
		}
	}

	/// Size of one row in bytes.
	#[inline]
	pub fn stride(&self) -> usize {
		self.component_type.size() * self.num_components
	}

	/// The number of rows.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.data.len() / self.stride()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	#[inline]
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Decodes the rows as `[f32; N]`. Returns `None` when the attribute is
	/// not a float attribute of exactly `N` components.
	pub fn f32_rows<const N: usize>(&self) -> Option<Vec<[f32; N]>> {
		if self.component_type != ComponentDataType::F32 || self.num_components != N {
			return None;
		}
		let rows = self.data.chunks_exact(4 * N)
			.map(|row| {
				let mut out = [0.0f32; N];
				for (c, bytes) in out.iter_mut().zip(row.chunks_exact(4)) {
					*c = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
				}
				out
			})
			.collect();
		Some(rows)
	}

	/// Appends all rows of `other`, which must share this attribute's layout.
	pub fn extend_from(&mut self, other: &Attribute) -> Result<(), Err> {
		if self.layout() != other.layout() {
			return Err(Err::LayoutMismatch(self.name.clone()));
		}
		self.data.extend_from_slice(&other.data);
		Ok(())
	}

	/// Per-component minimum and maximum of a float attribute. `None` for
	/// integer attributes and empty buffers.
	pub fn f32_bounds(&self) -> Option<(Vec<f32>, Vec<f32>)> {
		if self.component_type != ComponentDataType::F32 || self.is_empty() {
			return None;
		}
		let n = self.num_components;
		let mut min = vec![f32::INFINITY; n];
		let mut max = vec![f32::NEG_INFINITY; n];
		for row in self.data.chunks_exact(4 * n) {
			for (i, bytes) in row.chunks_exact(4).enumerate() {
				let v = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
				min[i] = min[i].min(v);
				max[i] = max[i].max(v);
			}
		}
		Some((min, max))
	}
}


/// Component type, width and normalization of an attribute. Two attributes
/// can be concatenated only when their layouts are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLayout {
	pub component_type: ComponentDataType,
	pub num_components: usize,
	pub normalized: bool,
}

impl AttributeLayout {
	pub fn new(component_type: ComponentDataType, num_components: usize, normalized: bool) -> Self {
		Self { component_type, num_components, normalized }
	}

	pub fn f32(num_components: usize) -> Self {
		Self::new(ComponentDataType::F32, num_components, false)
	}

	#[inline]
	pub fn stride(&self) -> usize {
		self.component_type.size() * self.num_components
	}
}


/// The ordered set of attribute names and layouts of a geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributeSchema(Vec<(String, AttributeLayout)>);

impl AttributeSchema {
	pub fn of(attributes: &[Attribute]) -> Self {
		Self(attributes.iter().map(|att| (att.name.clone(), att.layout())).collect())
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|(name, _)| name.as_str())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for AttributeSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let names = self.names().collect::<Vec<_>>();
		write!(f, "[{}]", names.join(", "))
	}
}


/// glTF accessor component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentDataType {
	I8,
	U8,
	I16,
	U16,
	U32,
	F32,
}

impl ComponentDataType {
	/// returns the size of the data type in bytes e.g. 4 for F32
	#[inline]
	pub fn size(self) -> usize {
		match self {
			ComponentDataType::I8 | ComponentDataType::U8 => 1,
			ComponentDataType::I16 | ComponentDataType::U16 => 2,
			ComponentDataType::U32 | ComponentDataType::F32 => 4,
		}
	}

	#[inline]
	pub fn is_float(self) -> bool {
		matches!(self, ComponentDataType::F32)
	}

	/// The `componentType` code used in glTF JSON.
	pub fn gltf_code(self) -> u32 {
		match self {
			ComponentDataType::I8 => 5120,
			ComponentDataType::U8 => 5121,
			ComponentDataType::I16 => 5122,
			ComponentDataType::U16 => 5123,
			ComponentDataType::U32 => 5125,
			ComponentDataType::F32 => 5126,
		}
	}

	pub fn from_gltf_code(code: u32) -> Result<Self, Err> {
		match code {
			5120 => Ok(ComponentDataType::I8),
			5121 => Ok(ComponentDataType::U8),
			5122 => Ok(ComponentDataType::I16),
			5123 => Ok(ComponentDataType::U16),
			5125 => Ok(ComponentDataType::U32),
			5126 => Ok(ComponentDataType::F32),
			_ => Err(Err::UnsupportedComponentType(code)),
		}
	}
}

impl From<gltf::accessor::DataType> for ComponentDataType {
	fn from(data_type: gltf::accessor::DataType) -> Self {
		use gltf::accessor::DataType;
		match data_type {
			DataType::I8 => ComponentDataType::I8,
			DataType::U8 => ComponentDataType::U8,
			DataType::I16 => ComponentDataType::I16,
			DataType::U16 => ComponentDataType::U16,
			DataType::U32 => ComponentDataType::U32,
			DataType::F32 => ComponentDataType::F32,
		}
	}
}
