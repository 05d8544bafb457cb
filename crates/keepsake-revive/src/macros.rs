/// Implement the persistence plumbing for a struct that implements [`Revive`].
///
/// Generates [`Fields`], [`SaveObject`], [`FromNode`] and `serde::Serialize`
/// for the named struct. Serializing the struct produces its envelope, so a
/// registered value nested in another saves itself. The struct must be
/// `Default + Clone + PartialEq + Debug + Send + Sync`, and every listed
/// field must implement both `Serialize` and [`FromNode`].
///
/// An optional `extra: <field>` names a `BTreeMap<String, Node>` that keeps
/// saved fields the struct does not declare, so they survive a load/save
/// cycle.
///
/// ```
/// use std::collections::BTreeMap;
/// use keepsake_revive::{save_object, Node, Revive};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Crate {
///     label: String,
///     weight: u32,
///     extra: BTreeMap<String, Node>,
/// }
///
/// impl Revive for Crate {
///     const TAG: &'static str = "Crate";
/// }
///
/// save_object!(Crate { label, weight } extra: extra);
///
/// let json = serde_json::to_value(&Crate { label: "ore".into(), weight: 3, ..Default::default() }).unwrap();
/// assert_eq!(json["ctor"], "Crate");
/// assert_eq!(json["data"]["weight"], 3);
/// ```
///
/// [`Revive`]: crate::Revive
/// [`Fields`]: crate::Fields
/// [`SaveObject`]: crate::SaveObject
/// [`FromNode`]: crate::FromNode
#[macro_export]
macro_rules! save_object {
    (@extra $this:ident, $name:ident, $value:ident, $extra:ident) => {{
        $this.$extra.insert(::std::string::String::from($name), $value);
        Ok(true)
    }};
    (@extra $this:ident, $name:ident, $value:ident) => {{
        let _ = ($name, $value);
        Ok(false)
    }};
    ($ty:ident { $($field:ident),* $(,)? } $(extra: $extra:ident)?) => {
        impl $crate::Fields for $ty {
            fn own_fields(
                &self,
            ) -> $crate::TypeResult<
                $crate::__private::serde_json::Map<::std::string::String, $crate::__private::serde_json::Value>,
            > {
                let mut fields = $crate::__private::serde_json::Map::new();
                $(
                    fields.insert(
                        ::std::string::String::from(stringify!($field)),
                        $crate::__private::encode_field(&self.$field)?,
                    );
                )*
                $(
                    for (name, value) in &self.$extra {
                        fields.insert(name.clone(), $crate::__private::encode_field(value)?);
                    }
                )?
                Ok(fields)
            }

            fn assign_field(&mut self, name: &str, value: $crate::Node) -> $crate::TypeResult<bool> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::FromNode::from_node(value)?;
                            Ok(true)
                        }
                    )*
                    _ => $crate::save_object!(@extra self, name, value $(, $extra)?),
                }
            }
        }

        impl $crate::SaveObject for $ty {
            fn tag(&self) -> &'static str {
                <$ty as $crate::Revive>::TAG
            }

            fn field_view(
                &self,
            ) -> $crate::TypeResult<
                $crate::__private::serde_json::Map<::std::string::String, $crate::__private::serde_json::Value>,
            > {
                <$ty as $crate::Fields>::own_fields(self)
            }

            fn to_envelope(&self) -> $crate::TypeResult<$crate::Envelope> {
                <$ty as $crate::Revive>::to_json(self)
            }

            fn clone_object(&self) -> ::std::boxed::Box<dyn $crate::SaveObject> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }

            fn eq_object(&self, other: &dyn $crate::SaveObject) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| other == self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }
        }

        impl $crate::FromNode for $ty {
            fn from_node(node: $crate::Node) -> $crate::TypeResult<Self> {
                node.into_instance::<$ty>()
            }
        }

        impl $crate::__private::serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                let envelope = <$ty as $crate::Revive>::to_json(self)
                    .map_err(<S::Error as $crate::__private::serde::ser::Error>::custom)?;
                $crate::__private::serde::Serialize::serialize(&envelope, serializer)
            }
        }
    };
}
