//! Accessors for `SEQUENCE`, `SET`, and the context-switching types
//! `EXTERNAL`, `EMBEDDED PDV`, and `CHARACTER STRING`.

use alloc::vec::Vec;

use super::Element;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::rules::Variant;
use crate::tag::{Class, Tag};
use crate::types::{CharacterString, EmbeddedPdv, External, ExternalEncoding, Identification};

impl<R: Variant> Element<R> {
    /// Reads the element as a `SEQUENCE`, materializing its children in
    /// order. The children are owned copies; mutating them does not affect
    /// this element until they are written back.
    pub fn sequence(&self) -> Result<Vec<Element<R>>, DecodeError> {
        if !self.constructed {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::ConstructedEncodingRequired,
                Self::codec(),
            ));
        }

        let mut children = Vec::new();
        let mut input: &[u8] = &self.value;
        while !input.is_empty() {
            let (child, rest) = Element::from_bytes(input)?;
            children.push(child);
            input = rest;
        }
        Ok(children)
    }

    /// Replaces the contents with the concatenated encodings of `children`
    /// and marks the element constructed.
    pub fn set_sequence(&mut self, children: &[Element<R>]) {
        let mut value = Vec::new();
        for child in children {
            value.extend_from_slice(&child.to_bytes());
        }
        self.constructed = true;
        self.value = value;
    }

    /// Reads the element as a `SET`. No member ordering is enforced under
    /// the rules this crate implements.
    pub fn set(&self) -> Result<Vec<Element<R>>, DecodeError> {
        self.sequence()
    }

    pub fn set_set(&mut self, children: &[Element<R>]) {
        self.set_sequence(children);
    }

    /// Reads the element as an `EXTERNAL` in the X.208 wire form: an optional
    /// direct-reference `OBJECT IDENTIFIER`, an optional indirect-reference
    /// `INTEGER`, an optional `ObjectDescriptor`, and the context-tagged
    /// encoding choice.
    pub fn external(&self) -> Result<External, DecodeError> {
        let codec = Self::codec();
        let mut direct_reference = None;
        let mut indirect_reference = None;
        let mut data_value_descriptor = None;
        let mut data_value = None;

        for child in self.sequence()? {
            match (child.tag_class(), child.tag_number()) {
                (Class::Universal, 6) => direct_reference = Some(child.object_identifier()?),
                (Class::Universal, 2) => indirect_reference = Some(child.integer()?),
                (Class::Universal, 7) => data_value_descriptor = Some(child.object_descriptor()?),
                (Class::Context, 0) => {
                    // [0] wraps the complete encoding of a single ASN.1 value.
                    if child.is_primitive() {
                        return Err(DecodeError::from_kind(
                            DecodeErrorKind::ConstructedEncodingRequired,
                            codec,
                        ));
                    }
                    data_value = Some(ExternalEncoding::SingleAsn1Type(child.value().to_vec()));
                }
                (Class::Context, 1) => {
                    data_value = Some(ExternalEncoding::OctetAligned(child.octet_string()?));
                }
                (Class::Context, 2) => {
                    data_value = Some(ExternalEncoding::Arbitrary(child.bit_string()?));
                }
                _ => {
                    return Err(DecodeError::from_kind(
                        DecodeErrorKind::InvalidChoice {
                            context: "EXTERNAL",
                            tag: child.tag(),
                        },
                        codec,
                    ));
                }
            }
        }

        let identification = match (direct_reference, indirect_reference) {
            (Some(direct), None) => Identification::Syntax(direct),
            (None, Some(indirect)) => Identification::PresentationContextId(indirect),
            (Some(direct), Some(indirect)) => Identification::ContextNegotiation {
                presentation_context_id: indirect,
                transfer_syntax: direct,
            },
            (None, None) => return Err(DecodeError::missing_field("identification", codec)),
        };

        Ok(External {
            identification,
            data_value_descriptor,
            data_value: data_value
                .ok_or_else(|| DecodeError::missing_field("data-value", codec))?,
        })
    }

    /// Writes an `EXTERNAL`. CER and DER permit only the
    /// [`Identification::Syntax`] alternative; BER also accepts
    /// `PresentationContextId` and `ContextNegotiation`.
    pub fn set_external(&mut self, value: &External) -> Result<(), EncodeError> {
        let codec = Self::codec();
        let mut children: Vec<Element<R>> = Vec::new();

        match &value.identification {
            Identification::Syntax(syntax) => {
                let mut child = Element::with_tag(Tag::OBJECT_IDENTIFIER);
                child.set_object_identifier(syntax);
                children.push(child);
            }
            Identification::PresentationContextId(id) if R::RULES.is_ber() => {
                let mut child = Element::with_tag(Tag::INTEGER);
                child.set_integer(id.clone());
                children.push(child);
            }
            Identification::ContextNegotiation {
                presentation_context_id,
                transfer_syntax,
            } if R::RULES.is_ber() => {
                let mut direct = Element::with_tag(Tag::OBJECT_IDENTIFIER);
                direct.set_object_identifier(transfer_syntax);
                children.push(direct);
                let mut indirect = Element::with_tag(Tag::INTEGER);
                indirect.set_integer(presentation_context_id.clone());
                children.push(indirect);
            }
            _ => return Err(EncodeError::invalid_identification("EXTERNAL", codec)),
        }

        if let Some(descriptor) = &value.data_value_descriptor {
            let mut child = Element::with_tag(Tag::OBJECT_DESCRIPTOR);
            child.set_object_descriptor(descriptor)?;
            children.push(child);
        }

        match &value.data_value {
            ExternalEncoding::SingleAsn1Type(encoding) => {
                let mut child = Element::with_tag(Tag::new(Class::Context, 0));
                child.set_constructed(true);
                child.set_value(encoding.clone());
                children.push(child);
            }
            ExternalEncoding::OctetAligned(octets) => {
                let mut child = Element::with_tag(Tag::new(Class::Context, 1));
                child.set_octet_string(octets);
                children.push(child);
            }
            ExternalEncoding::Arbitrary(bits) => {
                let mut child = Element::with_tag(Tag::new(Class::Context, 2));
                child.set_bit_string(bits);
                children.push(child);
            }
        }

        self.set_sequence(&children);
        Ok(())
    }

    /// Reads the element as an `EMBEDDED PDV`: a `[0]`-wrapped identification
    /// `CHOICE` and a `[2]` data value.
    pub fn embedded_pdv(&self) -> Result<EmbeddedPdv, DecodeError> {
        let codec = Self::codec();
        let (identification, data_value) = self.identification_and_value("EMBEDDED PDV")?;
        Ok(EmbeddedPdv {
            identification: identification
                .ok_or_else(|| DecodeError::missing_field("identification", codec))?,
            data_value: data_value
                .ok_or_else(|| DecodeError::missing_field("data-value", codec))?,
        })
    }

    /// Writes an `EMBEDDED PDV`. Under CER and DER the
    /// `PresentationContextId` and `ContextNegotiation` alternatives are
    /// downgraded to `Fixed`.
    pub fn set_embedded_pdv(&mut self, value: &EmbeddedPdv) {
        let identification = Self::downgrade(&value.identification);
        let wrapper = Self::identification_element(identification);

        let mut data = Element::with_tag(Tag::new(Class::Context, 2));
        data.set_octet_string(&value.data_value);

        self.set_sequence(&[wrapper, data]);
    }

    /// Reads the element as a `CHARACTER STRING`; identical in shape to
    /// `EMBEDDED PDV`.
    pub fn character_string(&self) -> Result<CharacterString, DecodeError> {
        let codec = Self::codec();
        let (identification, string_value) = self.identification_and_value("CHARACTER STRING")?;
        Ok(CharacterString {
            identification: identification
                .ok_or_else(|| DecodeError::missing_field("identification", codec))?,
            string_value: string_value
                .ok_or_else(|| DecodeError::missing_field("string-value", codec))?,
        })
    }

    pub fn set_character_string(&mut self, value: &CharacterString) {
        let identification = Self::downgrade(&value.identification);
        let wrapper = Self::identification_element(identification);

        let mut data = Element::with_tag(Tag::new(Class::Context, 2));
        data.set_octet_string(&value.string_value);

        self.set_sequence(&[wrapper, data]);
    }

    fn identification_and_value(
        &self,
        context: &'static str,
    ) -> Result<(Option<Identification>, Option<Vec<u8>>), DecodeError> {
        let codec = Self::codec();
        let mut identification = None;
        let mut data_value = None;

        for child in self.sequence()? {
            match (child.tag_class(), child.tag_number()) {
                (Class::Context, 0) => {
                    identification = Some(child.identification_choice(context)?);
                }
                (Class::Context, 2) => data_value = Some(child.octet_string()?),
                _ => {
                    return Err(DecodeError::from_kind(
                        DecodeErrorKind::InvalidChoice {
                            context,
                            tag: child.tag(),
                        },
                        codec,
                    ));
                }
            }
        }

        Ok((identification, data_value))
    }

    /// Decodes the identification `CHOICE` held inside its `[0]` wrapper.
    /// CER and DER reject the `presentation-context-id` and
    /// `context-negotiation` alternatives.
    fn identification_choice(&self, context: &'static str) -> Result<Identification, DecodeError> {
        let codec = Self::codec();
        let children = self.sequence()?;
        let [choice] = children.as_slice() else {
            return Err(DecodeError::missing_field("identification", codec));
        };

        let invalid_choice = |tag| {
            DecodeError::from_kind(DecodeErrorKind::InvalidChoice { context, tag }, codec)
        };

        if choice.tag_class() != Class::Context {
            return Err(invalid_choice(choice.tag()));
        }

        match choice.tag_number() {
            0 => {
                let mut abstract_syntax = None;
                let mut transfer_syntax = None;
                for inner in choice.sequence()? {
                    match (inner.tag_class(), inner.tag_number()) {
                        (Class::Context, 0) => abstract_syntax = Some(inner.object_identifier()?),
                        (Class::Context, 1) => transfer_syntax = Some(inner.object_identifier()?),
                        _ => return Err(invalid_choice(inner.tag())),
                    }
                }
                Ok(Identification::Syntaxes {
                    abstract_syntax: abstract_syntax
                        .ok_or_else(|| DecodeError::missing_field("abstract", codec))?,
                    transfer_syntax: transfer_syntax
                        .ok_or_else(|| DecodeError::missing_field("transfer", codec))?,
                })
            }
            1 => Ok(Identification::Syntax(choice.object_identifier()?)),
            2 if R::RULES.is_canonical() => Err(invalid_choice(choice.tag())),
            2 => Ok(Identification::PresentationContextId(choice.integer()?)),
            3 if R::RULES.is_canonical() => Err(invalid_choice(choice.tag())),
            3 => {
                let mut presentation_context_id = None;
                let mut transfer_syntax = None;
                for inner in choice.sequence()? {
                    match (inner.tag_class(), inner.tag_number()) {
                        (Class::Context, 0) => presentation_context_id = Some(inner.integer()?),
                        (Class::Context, 1) => transfer_syntax = Some(inner.object_identifier()?),
                        _ => return Err(invalid_choice(inner.tag())),
                    }
                }
                Ok(Identification::ContextNegotiation {
                    presentation_context_id: presentation_context_id
                        .ok_or_else(|| DecodeError::missing_field("presentation-context-id", codec))?,
                    transfer_syntax: transfer_syntax
                        .ok_or_else(|| DecodeError::missing_field("transfer-syntax", codec))?,
                })
            }
            4 => Ok(Identification::TransferSyntax(choice.object_identifier()?)),
            5 => {
                choice.null()?;
                Ok(Identification::Fixed)
            }
            _ => Err(invalid_choice(choice.tag())),
        }
    }

    fn downgrade(identification: &Identification) -> &Identification {
        if R::RULES.is_canonical()
            && matches!(
                identification,
                Identification::PresentationContextId(_)
                    | Identification::ContextNegotiation { .. }
            )
        {
            &Identification::Fixed
        } else {
            identification
        }
    }

    /// Builds the `[0]`-wrapped identification `CHOICE` element.
    fn identification_element(identification: &Identification) -> Element<R> {
        let choice = match identification {
            Identification::Syntaxes {
                abstract_syntax,
                transfer_syntax,
            } => {
                let mut abstract_child = Element::with_tag(Tag::new(Class::Context, 0));
                abstract_child.set_object_identifier(abstract_syntax);
                let mut transfer_child = Element::with_tag(Tag::new(Class::Context, 1));
                transfer_child.set_object_identifier(transfer_syntax);

                let mut choice = Element::with_tag(Tag::new(Class::Context, 0));
                choice.set_sequence(&[abstract_child, transfer_child]);
                choice
            }
            Identification::Syntax(syntax) => {
                let mut choice = Element::with_tag(Tag::new(Class::Context, 1));
                choice.set_object_identifier(syntax);
                choice
            }
            Identification::PresentationContextId(id) => {
                let mut choice = Element::with_tag(Tag::new(Class::Context, 2));
                choice.set_integer(id.clone());
                choice
            }
            Identification::ContextNegotiation {
                presentation_context_id,
                transfer_syntax,
            } => {
                let mut id_child = Element::with_tag(Tag::new(Class::Context, 0));
                id_child.set_integer(presentation_context_id.clone());
                let mut transfer_child = Element::with_tag(Tag::new(Class::Context, 1));
                transfer_child.set_object_identifier(transfer_syntax);

                let mut choice = Element::with_tag(Tag::new(Class::Context, 3));
                choice.set_sequence(&[id_child, transfer_child]);
                choice
            }
            Identification::TransferSyntax(syntax) => {
                let mut choice = Element::with_tag(Tag::new(Class::Context, 4));
                choice.set_object_identifier(syntax);
                choice
            }
            Identification::Fixed => {
                let mut choice = Element::with_tag(Tag::new(Class::Context, 5));
                choice.set_null();
                choice
            }
        };

        let mut wrapper = Element::with_tag(Tag::new(Class::Context, 0));
        wrapper.set_sequence(&[choice]);
        wrapper
    }
}
